//! Display target resolution
//!
//! The display target is read once at session start. Sources, lowest to
//! highest priority: the config file, the `DISPLAY` environment variable, and a
//! `-display NAME` / `--display NAME` / `--display=NAME` command-line flag.

/// Environment key holding the display target
pub const DISPLAY_ENV_KEY: &str = "DISPLAY";

/// Name of the host display to connect to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayTarget(Option<String>);

impl DisplayTarget {
    /// The host's default display
    pub const fn host_default() -> Self {
        Self(None)
    }

    /// Resolve the display target from arguments, environment and config
    ///
    /// `env` is queried for [`DISPLAY_ENV_KEY`] only. A flag without a value
    /// is ignored.
    pub fn resolve<S, F>(args: &[S], env: F, configured: Option<&str>) -> Self
    where
        S: AsRef<str>,
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = display_flag(args) {
            return Self(Some(name));
        }
        if let Some(name) = env(DISPLAY_ENV_KEY).filter(|name| !name.is_empty()) {
            return Self(Some(name));
        }
        Self(configured.map(str::to_string))
    }

    /// The display name, or `None` for the host default
    pub fn name(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl std::fmt::Display for DisplayTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(name) => f.write_str(name),
            None => f.write_str("<default>"),
        }
    }
}

fn display_flag<S: AsRef<str>>(args: &[S]) -> Option<String> {
    let mut found = None;
    let mut iter = args.iter().map(AsRef::as_ref);
    while let Some(arg) = iter.next() {
        if let Some(value) = arg.strip_prefix("--display=") {
            found = Some(value.to_string());
        } else if arg == "-display" || arg == "--display" {
            if let Some(value) = iter.next() {
                found = Some(value.to_string());
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with(display: Option<&str>) -> impl Fn(&str) -> Option<String> {
        let display = display.map(str::to_string);
        move |key| (key == DISPLAY_ENV_KEY).then(|| display.clone()).flatten()
    }

    #[test]
    fn test_flag_wins_over_env() {
        let target = DisplayTarget::resolve(&["app", "-display", ":2"], env_with(Some(":0")), None);
        assert_eq!(target.name(), Some(":2"));
    }

    #[test]
    fn test_env_used_without_flag() {
        let target = DisplayTarget::resolve(&["app"], env_with(Some(":0")), Some(":9"));
        assert_eq!(target.name(), Some(":0"));
    }

    #[test]
    fn test_config_is_last_resort() {
        let target = DisplayTarget::resolve(&["app"], env_with(None), Some(":9"));
        assert_eq!(target.name(), Some(":9"));

        let target = DisplayTarget::resolve::<&str, _>(&[], env_with(None), None);
        assert_eq!(target, DisplayTarget::host_default());
    }

    #[test]
    fn test_flag_forms() {
        let target = DisplayTarget::resolve(&["--display=host:1"], env_with(None), None);
        assert_eq!(target.name(), Some("host:1"));

        let target = DisplayTarget::resolve(&["--display", "host:3"], env_with(None), None);
        assert_eq!(target.name(), Some("host:3"));

        // Dangling flag falls through to the environment
        let target = DisplayTarget::resolve(&["-display"], env_with(Some(":5")), None);
        assert_eq!(target.name(), Some(":5"));
    }
}
