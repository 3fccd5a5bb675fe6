//! Default configuration values

/// Version label used when none is given on the command line
pub const DEFAULT_VERSION: &str = "master";

/// Positional argument that switches on clean mode
pub const CLEAN_MARKER: &str = "clean";

/// Default number of parallel compile jobs for `make`
pub const DEFAULT_BUILD_JOBS: usize = 4;

/// Prefix root relative to the home directory (`~/run/<label>`)
pub const DEFAULT_PREFIX_ROOT: &str = "run";

/// Source root relative to the home directory (`~/outsrc/<label>`)
pub const DEFAULT_SOURCE_ROOT: &str = "outsrc";

/// Shared-data search path used when `XDG_DATA_DIRS` is unset
pub const DEFAULT_XDG_DATA_DIRS: &str = "/usr/local/share:/usr/share";

/// Library directory name passed to meson, so every project installs into `$PREFIX/lib`
pub const MESON_LIBDIR: &str = "lib";

/// Prefix of the per-architecture meson build directory (`obj-x86_64`)
pub const MESON_BUILD_DIR_PREFIX: &str = "obj-";

/// Site configuration file, relative to the prefix
pub const SITE_CONFIG_PATH: &str = "share/config.site";
