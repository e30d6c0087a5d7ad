//! Default values for configuration

pub fn default_language() -> String {
    "python".to_string()
}

pub fn default_server_name() -> String {
    "coverctx".to_string()
}

pub fn default_report_files() -> Vec<String> {
    vec!["coverage.xml".to_string(), "lcov.info".to_string()]
}

pub fn default_report_format() -> String {
    "auto".to_string()
}

pub fn default_baseline_suffix() -> String {
    "baseline".to_string()
}

pub fn default_max_report_age_secs() -> u64 {
    // 0 disables the staleness check
    0
}

pub fn default_max_context_files() -> usize {
    10
}

pub fn default_max_gap_lines() -> usize {
    200
}

pub fn default_low_coverage_threshold() -> f64 {
    80.0
}

pub fn default_target_coverage() -> f64 {
    90.0
}
