use serde::{Deserialize, Serialize};

/// Monochrome stencil drawn over a tile whose application is running.
#[derive(Debug)]
pub struct Mark {
    pub width: usize,
    pub height: usize,
    pixels: &'static [u8],
}

impl Mark {
    pub fn rows(&self) -> impl Iterator<Item = &'static [u8]> {
        self.pixels.chunks_exact(self.width)
    }
}

#[rustfmt::skip]
static PLAY: Mark = Mark {
    width: 5,
    height: 9,
    pixels: &[
        1, 0, 0, 0, 0,
        1, 1, 0, 0, 0,
        1, 1, 1, 0, 0,
        1, 1, 1, 1, 0,
        1, 1, 1, 1, 1,
        1, 1, 1, 1, 0,
        1, 1, 1, 0, 0,
        1, 1, 0, 0, 0,
        1, 0, 0, 0, 0,
    ],
};

#[rustfmt::skip]
static DOTS: Mark = Mark {
    width: 10,
    height: 2,
    pixels: &[
        1, 1, 0, 0, 1, 1, 0, 0, 1, 1,
        1, 1, 0, 0, 1, 1, 0, 0, 1, 1,
    ],
};

#[rustfmt::skip]
static CORNER: Mark = Mark {
    width: 6,
    height: 6,
    pixels: &[
        0, 0, 0, 0, 0, 1,
        0, 0, 0, 0, 1, 1,
        0, 0, 0, 1, 1, 1,
        0, 0, 1, 1, 1, 1,
        0, 1, 1, 1, 1, 1,
        1, 1, 1, 1, 1, 1,
    ],
};

#[rustfmt::skip]
static CROSS: Mark = Mark {
    width: 7,
    height: 7,
    pixels: &[
        1, 1, 0, 0, 0, 1, 1,
        1, 1, 1, 0, 1, 1, 1,
        0, 1, 1, 1, 1, 1, 0,
        0, 0, 1, 1, 1, 0, 0,
        0, 1, 1, 1, 1, 1, 0,
        1, 1, 1, 0, 1, 1, 1,
        1, 1, 0, 0, 0, 1, 1,
    ],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkType {
    Play,
    Dots,
    Corner,
    #[default]
    Cross,
}

impl MarkType {
    pub fn mark(self) -> &'static Mark {
        match self {
            MarkType::Play => &PLAY,
            MarkType::Dots => &DOTS,
            MarkType::Corner => &CORNER,
            MarkType::Cross => &CROSS,
        }
    }

    /// Margins used when the settings do not name any.
    pub fn default_margins(self) -> (i32, i32) {
        match self {
            MarkType::Play => (0, 0),
            MarkType::Dots | MarkType::Corner => (-1, -1),
            MarkType::Cross => (-1, 0),
        }
    }
}

impl std::str::FromStr for MarkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "play" => Ok(MarkType::Play),
            "dots" => Ok(MarkType::Dots),
            "corner" => Ok(MarkType::Corner),
            "cross" => Ok(MarkType::Cross),
            _ => Err(format!("unknown mark type '{s}'")),
        }
    }
}

/// Position of a mark along one axis.
///
/// A positive margin counts from the top/left edge, a negative one from the
/// bottom/right edge where `-1` is flush. A mark that would not fit falls
/// back to offset zero.
pub(crate) fn mark_origin(margin: i32, extent: usize, size: usize) -> usize {
    let extent = extent as i64;
    let size = size as i64;
    let margin = margin as i64;
    if margin < 0 {
        let pos = extent - size + margin + 1;
        if pos >= 0 {
            return pos as usize;
        }
    } else if margin > 0 && margin + size <= extent {
        return margin as usize;
    }
    0
}
