//! Turns escape values into color bytes.  A palette is an ordered,
//! non-empty list of RGB colors treated as cyclic: the integer part
//! of a smoothed escape value picks an entry modulo the palette
//! length, and the fractional part blends toward the next entry, so
//! the gradient wraps around seamlessly however long the palette is.
//! Set members bypass the palette entirely and get one fixed color.

use errors::RenderError;
use escape::EscapeValue;

/// One color, each channel in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    /// Red channel.
    pub r: f64,
    /// Green channel.
    pub g: f64,
    /// Blue channel.
    pub b: f64,
}

impl Rgb {
    /// Parse an "RRGGBB" hex triple, with or without a leading '#'.
    pub fn from_hex(s: &str) -> Result<Rgb, RenderError> {
        let hex = if s.starts_with('#') { &s[1..] } else { s };
        if hex.len() != 6 || !hex.is_char_boundary(2) || !hex.is_char_boundary(4) {
            return Err(RenderError::Configuration(format!(
                "color {:?} is not an RRGGBB hex triple",
                s
            )));
        }
        let channel = |part: &str| -> Result<f64, RenderError> {
            match u8::from_str_radix(part, 16) {
                Ok(v) => Ok(f64::from(v) / 255.0),
                Err(_) => Err(RenderError::Configuration(format!(
                    "color {:?} is not an RRGGBB hex triple",
                    s
                ))),
            }
        };
        Ok(Rgb {
            r: channel(&hex[0..2])?,
            g: channel(&hex[2..4])?,
            b: channel(&hex[4..6])?,
        })
    }

    /// Black, the traditional color for the interior of the set.
    pub fn black() -> Rgb {
        Rgb {
            r: 0.0,
            g: 0.0,
            b: 0.0,
        }
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        Rgb {
            r: self.r * (1.0 - t) + other.r * t,
            g: self.g * (1.0 - t) + other.g * t,
            b: self.b * (1.0 - t) + other.b * t,
        }
    }

    // Channels are clamped on the way out so interpolation roundoff
    // can never wrap a byte.
    fn push_bytes(self, out: &mut Vec<u8>) {
        for &channel in &[self.r, self.g, self.b] {
            let clamped = if channel < 0.0 {
                0.0
            } else if channel > 1.0 {
                1.0
            } else {
                channel
            };
            out.push((clamped * 255.0).round() as u8);
        }
    }
}

/// An ordered, non-empty, cyclic list of colors.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    /// Constructor.  The only requirement is at least one color; a
    /// single-color palette interpolates to itself.
    pub fn new(colors: Vec<Rgb>) -> Result<Palette, RenderError> {
        if colors.is_empty() {
            return Err(RenderError::Configuration(
                "palette must contain at least one color".to_string(),
            ));
        }
        Ok(Palette { colors })
    }

    /// Parse a comma-separated list of RRGGBB triples, the format the
    /// command line hands us.  A single color is duplicated so the
    /// gradient still has two endpoints to blend between.
    pub fn from_hex_list(s: &str) -> Result<Palette, RenderError> {
        let mut colors = Vec::new();
        for part in s.split(',') {
            colors.push(Rgb::from_hex(part.trim())?);
        }
        if colors.len() == 1 {
            let only = colors[0];
            colors.push(only);
        }
        Palette::new(colors)
    }

    /// The built-in warm-to-cool gradient used when no palette is
    /// given on the command line.
    pub fn warm_to_cool() -> Palette {
        Palette {
            colors: vec![
                Rgb { r: 1.00, g: 0.55, b: 0.00 },
                Rgb { r: 1.00, g: 0.20, b: 0.05 },
                Rgb { r: 0.85, g: 0.10, b: 0.40 },
                Rgb { r: 0.50, g: 0.15, b: 0.70 },
                Rgb { r: 0.15, g: 0.30, b: 0.85 },
                Rgb { r: 0.05, g: 0.55, b: 0.90 },
            ],
        }
    }

    /// The number of colors in the cycle.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Palettes are never empty; this exists for the conventional
    /// pairing with len().
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// The color for one smoothed escape value: entry ⌊v⌋ mod n
    /// blended toward its cyclic neighbor by the fractional part of
    /// v.  Smoothing can undershoot zero for points far outside the
    /// set; negative values are clamped to zero first so the fraction
    /// is always in [0, 1).
    pub fn color_at(&self, v: f64) -> Rgb {
        let v = if v < 0.0 { 0.0 } else { v };
        let n = self.colors.len();
        let idx = (v.floor() as usize) % n;
        let next = (idx + 1) % n;
        self.colors[idx].lerp(self.colors[next], v.fract())
    }

    /// Color one row of escape values into width*3 bytes, members
    /// painted with `member_color`.  Channels become bytes by
    /// round(255 * channel), half away from zero; an exact 50/50
    /// blend of ff0000 and 00ff00 is (128, 128, 0).
    pub fn color_row(&self, values: &[EscapeValue], member_color: Rgb) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(values.len() * 3);
        for value in values {
            match *value {
                EscapeValue::Member => member_color.push_bytes(&mut bytes),
                EscapeValue::Escaped(v) => self.color_at(v).push_bytes(&mut bytes),
            }
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red_green() -> Palette {
        Palette::new(vec![
            Rgb { r: 1.0, g: 0.0, b: 0.0 },
            Rgb { r: 0.0, g: 1.0, b: 0.0 },
        ])
        .unwrap()
    }

    #[test]
    fn empty_palette_is_rejected() {
        assert!(Palette::new(vec![]).is_err());
    }

    #[test]
    fn single_color_palette_always_returns_that_color() {
        let p = Palette::new(vec![Rgb { r: 0.2, g: 0.4, b: 0.6 }]).unwrap();
        for &v in &[0.0, 0.25, 0.5, 1.0, 7.75, 1000.0] {
            assert_eq!(p.color_at(v), Rgb { r: 0.2, g: 0.4, b: 0.6 });
        }
    }

    #[test]
    fn integer_values_hit_palette_entries_exactly() {
        let p = red_green();
        assert_eq!(p.color_at(0.0), Rgb { r: 1.0, g: 0.0, b: 0.0 });
        assert_eq!(p.color_at(1.0), Rgb { r: 0.0, g: 1.0, b: 0.0 });
        // The cycle wraps back around.
        assert_eq!(p.color_at(2.0), Rgb { r: 1.0, g: 0.0, b: 0.0 });
    }

    #[test]
    fn half_blend_of_red_and_green_rounds_to_128() {
        let p = red_green();
        let bytes = p.color_row(&[EscapeValue::Escaped(0.5)], Rgb::black());
        assert_eq!(bytes, vec![128, 128, 0]);
    }

    #[test]
    fn members_get_the_member_color() {
        let p = red_green();
        let inside = Rgb { r: 1.0, g: 1.0, b: 1.0 };
        let bytes = p.color_row(&[EscapeValue::Member, EscapeValue::Escaped(0.0)], inside);
        assert_eq!(bytes, vec![255, 255, 255, 255, 0, 0]);
    }

    #[test]
    fn negative_smoothing_undershoot_clamps_to_the_first_color() {
        let p = red_green();
        assert_eq!(p.color_at(-3.5), p.color_at(0.0));
    }

    #[test]
    fn row_is_three_bytes_per_value() {
        let p = Palette::warm_to_cool();
        let values = [
            EscapeValue::Escaped(1.5),
            EscapeValue::Member,
            EscapeValue::Escaped(12.25),
            EscapeValue::Escaped(0.0),
        ];
        assert_eq!(p.color_row(&values, Rgb::black()).len(), 12);
    }

    #[test]
    fn hex_parsing_round_trips_primaries() {
        assert_eq!(Rgb::from_hex("ff0000").unwrap(), Rgb { r: 1.0, g: 0.0, b: 0.0 });
        assert_eq!(Rgb::from_hex("#00ff00").unwrap(), Rgb { r: 0.0, g: 1.0, b: 0.0 });
        assert!(Rgb::from_hex("f00").is_err());
        assert!(Rgb::from_hex("gg0000").is_err());
        assert!(Rgb::from_hex("ff00001").is_err());
    }

    #[test]
    fn hex_list_parses_in_order() {
        let p = Palette::from_hex_list("ff0000,00ff00,0000ff").unwrap();
        assert_eq!(p.len(), 3);
        assert_eq!(p.color_at(2.0), Rgb { r: 0.0, g: 0.0, b: 1.0 });
    }

    #[test]
    fn single_hex_color_is_duplicated() {
        let p = Palette::from_hex_list("336699").unwrap();
        assert_eq!(p.len(), 2);
        assert_eq!(p.color_at(0.5), p.color_at(0.0));
    }

    #[test]
    fn bad_hex_list_is_rejected() {
        assert!(Palette::from_hex_list("").is_err());
        assert!(Palette::from_hex_list("ff0000,oops").is_err());
    }
}
