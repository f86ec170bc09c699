//! Status panel layout.
//!
//! The panel is a 128x64 monochrome bitmap. A [`Frame`] describes what goes
//! where; turning it into pixels is the driver's job. [`TracingDisplay`]
//! is a driver that writes frames to the log, used on hosts without a panel.

use std::fmt;

use async_trait::async_trait;
use tracing::debug;

use hygronode_types::Reading;

use crate::error::Result;
use crate::traits::DisplayRenderer;

/// Panel width in pixels.
pub const PANEL_WIDTH: u16 = 128;
/// Panel height in pixels.
pub const PANEL_HEIGHT: u16 = 64;

/// Top-row status icons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusIcons {
    /// Radio is awake.
    pub network: bool,
    /// Datagrams are being sent.
    pub transmitting: bool,
    /// A sensor measurement is in progress.
    pub sensing: bool,
    /// Guaranteed transmissions are still pending.
    pub budget_pending: bool,
}

impl StatusIcons {
    /// No activity icons.
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    /// Sensor read in progress.
    #[must_use]
    pub fn sensing() -> Self {
        Self {
            sensing: true,
            ..Self::default()
        }
    }

    /// Radio awake, not sending.
    #[must_use]
    pub fn network() -> Self {
        Self {
            network: true,
            ..Self::default()
        }
    }

    /// Radio awake and sending.
    #[must_use]
    pub fn transmitting() -> Self {
        Self {
            network: true,
            transmitting: true,
            ..Self::default()
        }
    }

    /// Set the budget indicator.
    #[must_use]
    pub fn with_budget_pending(mut self, pending: bool) -> Self {
        self.budget_pending = pending;
        self
    }
}

/// 16x16 glyphs available on the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Wifi,
    Timer,
    Home,
    Humidity,
    Temperature,
}

/// One drawable item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// 16x16 bitmap at `(x, y)`.
    Icon {
        icon: Icon,
        x: u16,
        y: u16,
    },
    /// Text with its top-left corner at `(x, y)`; `size` is the pixel scale.
    Text {
        text: String,
        x: u16,
        y: u16,
        size: u8,
    },
}

/// A complete panel image.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    elements: Vec<Element>,
}

impl Frame {
    /// Lay out the panel for the given icons and reading.
    pub fn compose(icons: StatusIcons, reading: Option<&Reading>) -> Self {
        let mut elements = Vec::with_capacity(8);

        if icons.network {
            elements.push(Element::Icon {
                icon: Icon::Wifi,
                x: 0,
                y: 0,
            });
        }
        if icons.budget_pending {
            elements.push(Element::Icon {
                icon: Icon::Timer,
                x: 80,
                y: 0,
            });
        }
        if icons.sensing {
            elements.push(Element::Icon {
                icon: Icon::Home,
                x: 98,
                y: 0,
            });
        }
        if icons.transmitting {
            elements.push(Element::Text {
                text: "Tx".to_string(),
                x: 116,
                y: 0,
                size: 1,
            });
        }

        elements.push(Element::Icon {
            icon: Icon::Humidity,
            x: 32,
            y: 16,
        });
        elements.push(Element::Text {
            text: humidity_text(reading),
            x: 56,
            y: 16,
            size: 2,
        });
        elements.push(Element::Icon {
            icon: Icon::Temperature,
            x: 32,
            y: 48,
        });
        elements.push(Element::Text {
            text: temperature_text(reading),
            x: 56,
            y: 48,
            size: 2,
        });

        Self { elements }
    }

    /// Drawable items in paint order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Whether the frame contains the given icon.
    pub fn has_icon(&self, icon: Icon) -> bool {
        self.elements
            .iter()
            .any(|e| matches!(e, Element::Icon { icon: i, .. } if *i == icon))
    }

    /// All text items, in paint order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|e| match e {
            Element::Text { text, .. } => Some(text.as_str()),
            Element::Icon { .. } => None,
        })
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for element in &self.elements {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            match element {
                Element::Icon { icon, .. } => write!(f, "[{:?}]", icon)?,
                Element::Text { text, .. } => f.write_str(text)?,
            }
        }
        Ok(())
    }
}

fn humidity_text(reading: Option<&Reading>) -> String {
    match reading {
        Some(r) => format!("{}%", r.humidity_percent),
        None => "-".to_string(),
    }
}

fn temperature_text(reading: Option<&Reading>) -> String {
    match reading {
        Some(r) => format!("{}F", r.temperature_f()),
        None => "-".to_string(),
    }
}

/// Display driver that logs each frame at debug level.
#[derive(Debug, Default)]
pub struct TracingDisplay {
    last: Option<Frame>,
}

impl TracingDisplay {
    /// Create a new log-backed display.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently rendered frame.
    pub fn last_frame(&self) -> Option<&Frame> {
        self.last.as_ref()
    }
}

#[async_trait]
impl DisplayRenderer for TracingDisplay {
    async fn init(&mut self) -> Result<()> {
        debug!(
            width = PANEL_WIDTH,
            height = PANEL_HEIGHT,
            "log display ready"
        );
        Ok(())
    }

    async fn render(&mut self, icons: StatusIcons, reading: Option<&Reading>) -> Result<()> {
        let frame = Frame::compose(icons, reading);
        if self.last.as_ref() != Some(&frame) {
            debug!(target: "hygronode::display", "{}", frame);
        }
        self.last = Some(frame);
        Ok(())
    }
}
