//! `From` implementations bridging `flowdip_config` types to `flowdip_core` types.

use crate::config::Tolerances;

impl From<&flowdip_config::TolerancesCfg> for Tolerances {
    fn from(c: &flowdip_config::TolerancesCfg) -> Self {
        Self {
            expected_flow: c.expected_flow,
            range_fraction: c.range_fraction,
            threshold_time_s: c.threshold_time_s,
            allowable_dip_time_s: c.allowable_dip_time_s,
            max_dip_abs: c.max_dip_abs,
            max_dip_frac: c.max_dip_frac,
            margin_frac: c.margin_frac,
        }
    }
}
