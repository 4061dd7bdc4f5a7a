//! Process-wide chart options and the icon symbol registry.
//!
//! Both are set up once before any chart is constructed. Calling [`init`] again with the same
//! values is a no-op; re-registering a symbol that draws the same path is accepted too.

use crate::error::{ChartError, Result};
use ahash::AHashMap;
use std::sync::{OnceLock, RwLock};

/// Locale strings shared by every chart on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalOptions {
    pub decimal_point: char,
    pub thousands_sep: char,
    pub download_csv: String,
}

impl Default for GlobalOptions {
    fn default() -> Self {
        Self {
            decimal_point: '.',
            thousands_sep: ',',
            download_csv: "Download CSV data".to_string(),
        }
    }
}

/// One SVG-style path instruction in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(f64, f64),
    LineTo(f64, f64),
}

/// Builds a symbol path inside the box `(x, y, w, h)`.
pub type SymbolFn = fn(f64, f64, f64, f64) -> Vec<PathCommand>;

static OPTIONS: OnceLock<GlobalOptions> = OnceLock::new();
static SYMBOLS: OnceLock<RwLock<AHashMap<String, SymbolFn>>> = OnceLock::new();

fn symbols() -> &'static RwLock<AHashMap<String, SymbolFn>> {
    SYMBOLS.get_or_init(|| RwLock::new(AHashMap::new()))
}

/// Download arrow over an open tray, used for the export button.
pub fn download_symbol(x: f64, y: f64, w: f64, h: f64) -> Vec<PathCommand> {
    use PathCommand::{LineTo, MoveTo};
    vec![
        // stem
        MoveTo(x + w * 0.5, y),
        LineTo(x + w * 0.5, y + h * 0.7),
        // head
        MoveTo(x + w * 0.3, y + h * 0.5),
        LineTo(x + w * 0.5, y + h * 0.7),
        LineTo(x + w * 0.7, y + h * 0.5),
        // tray
        MoveTo(x, y + h * 0.9),
        LineTo(x, y + h),
        LineTo(x + w, y + h),
        LineTo(x + w, y + h * 0.9),
    ]
}

/// Initialize the process-wide options and register the `download` symbol.
pub fn init(options: GlobalOptions) -> Result<()> {
    let stored = OPTIONS.get_or_init(|| options.clone());
    if *stored != options {
        return Err(ChartError::GlobalsConflict("options"));
    }
    register_symbol("download", download_symbol)?;
    log::debug!("global chart options initialized: {:?}", stored);
    Ok(())
}

/// Current options, or the defaults if [`init`] has not run.
pub fn options() -> GlobalOptions {
    OPTIONS.get().cloned().unwrap_or_default()
}

/// Register a named symbol. A second registration must draw the same path.
pub fn register_symbol(name: &str, f: SymbolFn) -> Result<()> {
    let mut map = symbols()
        .write()
        .map_err(|_| ChartError::GlobalsConflict("symbol registry"))?;
    if let Some(existing) = map.get(name) {
        // Compare the paths on a reference box instead of the function pointers.
        if existing(0.0, 0.0, 16.0, 16.0) != f(0.0, 0.0, 16.0, 16.0) {
            return Err(ChartError::GlobalsConflict("symbol"));
        }
        return Ok(());
    }
    map.insert(name.to_string(), f);
    Ok(())
}

pub fn symbol(name: &str) -> Option<SymbolFn> {
    symbols().read().ok()?.get(name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn other_symbol(x: f64, y: f64, _w: f64, _h: f64) -> Vec<PathCommand> {
        vec![PathCommand::MoveTo(x, y)]
    }

    #[test]
    fn init_twice_with_same_options_is_ok() {
        init(GlobalOptions::default()).unwrap();
        init(GlobalOptions::default()).unwrap();
        assert_eq!(options().thousands_sep, ',');
        assert!(symbol("download").is_some());
    }

    #[test]
    fn init_with_other_options_conflicts() {
        init(GlobalOptions::default()).unwrap();
        let other = GlobalOptions {
            thousands_sep: '.',
            decimal_point: ',',
            ..GlobalOptions::default()
        };
        assert!(matches!(init(other), Err(ChartError::GlobalsConflict(_))));
    }

    #[test]
    fn symbol_reregistration() {
        register_symbol("download", download_symbol).unwrap();
        register_symbol("download", download_symbol).unwrap();
        assert!(register_symbol("download", other_symbol).is_err());
    }

    #[test]
    fn download_path_stays_in_box() {
        let path = download_symbol(10.0, 20.0, 30.0, 40.0);
        assert_eq!(path.len(), 9);
        for cmd in path {
            let (x, y) = match cmd {
                PathCommand::MoveTo(x, y) | PathCommand::LineTo(x, y) => (x, y),
            };
            assert!((10.0..=40.0).contains(&x));
            assert!((20.0..=60.0).contains(&y));
        }
    }
}
