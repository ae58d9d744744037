// Copyright 2026 the Stereo3d Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host-supplied window properties.

use alloc::string::String;

/// Map and shade state the classifier needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Visibility {
    /// The window is mapped and viewable.
    pub viewable: bool,
    /// The window is rolled up to its title bar.
    pub shaded: bool,
    /// The window bypasses the window manager (menus, tooltips, popups).
    pub override_redirect: bool,
}

impl Visibility {
    /// A mapped, unshaded, managed window.
    pub const VISIBLE: Self = Self {
        viewable: true,
        shaded: false,
        override_redirect: false,
    };

    /// Whether the window can take part in the depth layout at all.
    #[inline]
    #[must_use]
    pub const fn is_layout_candidate(self) -> bool {
        self.viewable && !self.shaded && !self.override_redirect
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Self::VISIBLE
    }
}

/// Window type as advertised by the client (`_NET_WM_WINDOW_TYPE`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WindowType {
    /// The desktop background.
    Desktop,
    /// A panel or dock.
    Dock,
    /// A detached toolbar.
    Toolbar,
    /// A torn-off or popup menu.
    Menu,
    /// A utility palette.
    Utility,
    /// A splash screen.
    Splash,
    /// A dialog.
    Dialog,
    /// An ordinary top-level window.
    #[default]
    Normal,
    /// No type was advertised.
    Unknown,
}

impl WindowType {
    /// All types, for name lookup.
    pub const ALL: [Self; 9] = [
        Self::Desktop,
        Self::Dock,
        Self::Toolbar,
        Self::Menu,
        Self::Utility,
        Self::Splash,
        Self::Dialog,
        Self::Normal,
        Self::Unknown,
    ];

    /// The name used in match expressions.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Desktop => "Desktop",
            Self::Dock => "Dock",
            Self::Toolbar => "Toolbar",
            Self::Menu => "Menu",
            Self::Utility => "Utility",
            Self::Splash => "Splash",
            Self::Dialog => "Dialog",
            Self::Normal => "Normal",
            Self::Unknown => "Unknown",
        }
    }

    /// Looks a type up by name, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }
}

/// How the host stores a window's pixels, which decides the fragment
/// program variant a filter must use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    /// Normalized-coordinate 2D texture.
    #[default]
    Texture2d,
    /// Pixel-coordinate rectangle texture.
    Rectangle,
}

impl TextureTarget {
    /// Number of distinct targets.
    pub const COUNT: usize = 2;

    /// Slot index for per-target caches.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Texture2d => 0,
            Self::Rectangle => 1,
        }
    }
}

/// Paint attributes the host would use without the effect.
///
/// The effect multiplies these; it never replaces them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaintAttribs {
    /// Opacity multiplier (0 to 1).
    pub opacity: f64,
    /// Brightness multiplier (0 to 1).
    pub brightness: f64,
    /// Saturation multiplier (0 to 1).
    pub saturation: f64,
}

impl PaintAttribs {
    /// Fully opaque, unmodified color.
    pub const OPAQUE: Self = Self {
        opacity: 1.0,
        brightness: 1.0,
        saturation: 1.0,
    };

    /// Component-wise product.
    #[must_use]
    pub fn modulate(self, other: Self) -> Self {
        Self {
            opacity: self.opacity * other.opacity,
            brightness: self.brightness * other.brightness,
            saturation: self.saturation * other.saturation,
        }
    }
}

impl Default for PaintAttribs {
    fn default() -> Self {
        Self::OPAQUE
    }
}

/// Everything the effect reads about a window from the host.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WindowInfo {
    /// Frame rectangle in output pixels.
    pub geometry: kurbo::Rect,
    /// Map and shade state.
    pub visibility: Visibility,
    /// Advertised window type.
    pub window_type: WindowType,
    /// `WM_CLASS` class name.
    pub class: String,
    /// Window title.
    pub title: String,
    /// Paint attributes before the effect.
    pub paint: PaintAttribs,
    /// Texture target of the window's pixmap.
    pub texture_target: TextureTarget,
}

impl WindowInfo {
    /// A visible window of `window_type` covering `geometry`.
    #[must_use]
    pub fn new(window_type: WindowType, geometry: kurbo::Rect) -> Self {
        Self {
            geometry,
            window_type,
            ..Self::default()
        }
    }

    /// Sets the class name.
    #[must_use]
    pub fn with_class(mut self, class: &str) -> Self {
        self.class = String::from(class);
        self
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = String::from(title);
        self
    }

    /// Sets the visibility.
    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
}
