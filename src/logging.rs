//! Logging setup
//!
//! Installs a `tracing` subscriber writing to stderr so stdout stays free
//! for the CLI summary.

use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Initialize logging. `RUST_LOG` wins over the verbosity flag when set.
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Layers selected for per-triangle debug dumps via `SEGMESH_DEBUG_LAYER`.
/// An empty value selects every layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DebugLayers {
    #[default]
    Off,
    All,
    Only(Vec<u8>),
}

impl DebugLayers {
    pub fn from_env() -> Self {
        Self::parse(std::env::var("SEGMESH_DEBUG_LAYER").ok().as_deref())
    }

    pub fn parse(value: Option<&str>) -> Self {
        match value {
            None => DebugLayers::Off,
            Some(val) if val.trim().is_empty() => DebugLayers::All,
            Some(val) => DebugLayers::Only(
                val.split(',')
                    .filter_map(|entry| entry.trim().parse::<u8>().ok())
                    .collect(),
            ),
        }
    }

    pub fn includes(&self, layer: u8) -> bool {
        match self {
            DebugLayers::Off => false,
            DebugLayers::All => true,
            DebugLayers::Only(layers) => layers.contains(&layer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_layers_parse() {
        assert_eq!(DebugLayers::parse(None), DebugLayers::Off);
        assert!(!DebugLayers::parse(None).includes(0));

        let all = DebugLayers::parse(Some(" "));
        assert!(all.includes(0) && all.includes(5));

        let some = DebugLayers::parse(Some("1, 5,x"));
        assert_eq!(some, DebugLayers::Only(vec![1, 5]));
        assert!(some.includes(5));
        assert!(!some.includes(0));
    }
}
