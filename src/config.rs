//! Startup configuration: policy choice, CPU count, and their CLI surface.
//!
//! Constructed once at startup and threaded through to [`crate::scheduler::Scheduler`],
//! never consulted as a global afterward.

use crate::error::ConfigError;
use crate::policy::Policy;

/// Minimum and maximum CPU count accepted by the CLI surface.
pub const MIN_CPU_COUNT: usize = 1;
pub const MAX_CPU_COUNT: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    pub cpu_count: usize,
    pub policy: Policy,
}

impl Config {
    /// Parse `program <cpu_count> [ -r <timeslice_ms> | -p <age_weight> | -s ]`,
    /// given the arguments *after* the program name.
    pub fn from_args<I, S>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

        let cpu_count_arg = args
            .first()
            .ok_or_else(|| ConfigError::InvalidCpuCount("<missing>".to_string()))?;
        let cpu_count: usize = cpu_count_arg
            .parse()
            .ok()
            .filter(|n| (MIN_CPU_COUNT..=MAX_CPU_COUNT).contains(n))
            .ok_or_else(|| ConfigError::InvalidCpuCount(cpu_count_arg.clone()))?;

        let policy = match args.get(1).map(String::as_str) {
            None => Policy::Fcfs,
            Some("-r") => Policy::Rr {
                time_slice: parse_time_slice(&args, 2)?,
            },
            Some("-p") => Policy::Pa {
                age_weight: parse_flag_value(&args, "-p", 2)?,
            },
            Some("-s") => Policy::Srtf,
            Some(other) => return Err(ConfigError::UnknownFlag(other.to_string())),
        };

        Ok(Self { cpu_count, policy })
    }
}

fn parse_flag_value(args: &[String], flag: &'static str, index: usize) -> Result<u64, ConfigError> {
    let raw = args
        .get(index)
        .ok_or_else(|| ConfigError::MissingValue(flag.to_string()))?;
    raw.parse().map_err(|_| ConfigError::InvalidNumber {
        flag,
        value: raw.clone(),
    })
}

/// `timeslice_ms` is converted to ticks by integer-dividing by 100, with a
/// floor of 1 tick whenever the input exceeds 0.
fn parse_time_slice(args: &[String], index: usize) -> Result<u32, ConfigError> {
    let ms = parse_flag_value(args, "-r", index)?;
    let ticks = if ms > 0 { (ms / 100).max(1) } else { 0 };
    Ok(ticks as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_fcfs() {
        let cfg = Config::from_args(["4"]).unwrap();
        assert_eq!(cfg.cpu_count, 4);
        assert_eq!(cfg.policy, Policy::Fcfs);
    }

    #[test]
    fn rr_flag_converts_milliseconds_to_ticks() {
        let cfg = Config::from_args(["2", "-r", "250"]).unwrap();
        assert_eq!(cfg.policy, Policy::Rr { time_slice: 2 });
    }

    #[test]
    fn rr_floors_small_nonzero_timeslice_to_one_tick() {
        let cfg = Config::from_args(["2", "-r", "50"]).unwrap();
        assert_eq!(cfg.policy, Policy::Rr { time_slice: 1 });
    }

    #[test]
    fn pa_flag_parses_age_weight() {
        let cfg = Config::from_args(["1", "-p", "3"]).unwrap();
        assert_eq!(cfg.policy, Policy::Pa { age_weight: 3 });
    }

    #[test]
    fn srtf_flag_needs_no_value() {
        let cfg = Config::from_args(["1", "-s"]).unwrap();
        assert_eq!(cfg.policy, Policy::Srtf);
    }

    #[test]
    fn zero_cpu_count_is_rejected() {
        assert!(matches!(
            Config::from_args(["0"]),
            Err(ConfigError::InvalidCpuCount(_))
        ));
    }

    #[test]
    fn cpu_count_above_sixteen_is_rejected() {
        assert!(matches!(
            Config::from_args(["17"]),
            Err(ConfigError::InvalidCpuCount(_))
        ));
    }

    #[test]
    fn unparseable_cpu_count_is_rejected() {
        assert!(matches!(
            Config::from_args(["abc"]),
            Err(ConfigError::InvalidCpuCount(_))
        ));
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(matches!(
            Config::from_args(["2", "-x"]),
            Err(ConfigError::UnknownFlag(_))
        ));
    }

    #[test]
    fn missing_flag_value_is_rejected() {
        assert!(matches!(
            Config::from_args(["2", "-p"]),
            Err(ConfigError::MissingValue(_))
        ));
    }
}
