//! Upstream repositories of the stack, in build order

/// Brush resource library
pub const MYPAINT_BRUSHES: &str = "https://github.com/mypaint/mypaint-brushes.git";

/// Legacy branch of the brush library that the paint engine still expects
pub const MYPAINT_BRUSHES_BRANCH: &str = "v1.3.x";

/// Paint engine library
pub const LIBMYPAINT: &str = "https://github.com/mypaint/libmypaint.git";

/// Legacy branch of the paint engine with the stable 1.x API
pub const LIBMYPAINT_BRANCH: &str = "libmypaint-v1";

/// Color-management library
pub const BABL: &str = "https://gitlab.gnome.org/GNOME/babl.git";

/// Image-processing graph library
pub const GEGL: &str = "https://gitlab.gnome.org/GNOME/gegl.git";

/// Main application
pub const GIMP: &str = "https://gitlab.gnome.org/GNOME/gimp.git";
