//! The three original plugin-mode environment variables, kept as a thin,
//! explicitly-named layer on top of the generic `CPPSCANNER_`-prefixed
//! `figment::providers::Env` layering in [`crate::config`].
//!
//! These predate the generic layering and have their own boolean parsing
//! rule (`0`/`OFF`/`false`/`False` disable, anything else present enables).

const INDEX_LOCAL_SYMBOLS: &str = "CPPSCANNER_INDEX_LOCAL_SYMBOLS";
const HOME_DIR: &str = "CPPSCANNER_HOME_DIR";
const OUTPUT_DIR: &str = "CPPSCANNER_OUTPUT_DIR";

fn parse_bool_env(raw: &str) -> bool {
    !matches!(raw, "0" | "OFF" | "off" | "false" | "False" | "FALSE")
}

pub fn index_local_symbols_override() -> Option<bool> {
    std::env::var(INDEX_LOCAL_SYMBOLS).ok().map(|v| parse_bool_env(&v))
}

pub fn home_dir_override() -> Option<String> {
    std::env::var(HOME_DIR).ok()
}

pub fn output_dir_override() -> Option<String> {
    std::env::var(OUTPUT_DIR).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_env_recognizes_falsy_spellings() {
        assert!(!parse_bool_env("0"));
        assert!(!parse_bool_env("OFF"));
        assert!(!parse_bool_env("false"));
        assert!(!parse_bool_env("False"));
        assert!(parse_bool_env("1"));
        assert!(parse_bool_env("on"));
    }
}
