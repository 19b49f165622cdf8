use ratatui::style::Color;

/// Badge colors for cards whose icon failed to load.
pub const CARD_PALETTE: [Color; 12] = [
    Color::Rgb(0xFF, 0x6B, 0x6B),
    Color::Rgb(0x4E, 0xCD, 0xC4),
    Color::Rgb(0x45, 0xB7, 0xD1),
    Color::Rgb(0x96, 0xCE, 0xB4),
    Color::Rgb(0xFE, 0xCA, 0x57),
    Color::Rgb(0xFF, 0x9F, 0xF3),
    Color::Rgb(0x54, 0xA0, 0xFF),
    Color::Rgb(0x48, 0xDB, 0xFB),
    Color::Rgb(0xA2, 0x9B, 0xFE),
    Color::Rgb(0xFD, 0x79, 0xA8),
    Color::Rgb(0xFD, 0xCB, 0x6E),
    Color::Rgb(0x6C, 0x5C, 0xE7),
];

/// Badge colors for search results: the first eight card colors.
pub const SEARCH_PALETTE: [Color; 8] = [
    Color::Rgb(0xFF, 0x6B, 0x6B),
    Color::Rgb(0x4E, 0xCD, 0xC4),
    Color::Rgb(0x45, 0xB7, 0xD1),
    Color::Rgb(0x96, 0xCE, 0xB4),
    Color::Rgb(0xFE, 0xCA, 0x57),
    Color::Rgb(0xFF, 0x9F, 0xF3),
    Color::Rgb(0x54, 0xA0, 0xFF),
    Color::Rgb(0x48, 0xDB, 0xFB),
];

/// First-letter badge drawn in place of an icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Monogram {
    pub letter: String,
    pub color: Color,
}

/// Build the monogram for a title against one of the palettes.
pub fn monogram(title: &str, palette: &[Color]) -> Monogram {
    let letter = match title.chars().next() {
        Some(c) => c.to_uppercase().collect(),
        None => "?".to_string(),
    };
    let color = palette
        .get(color_index(title, palette.len()))
        .copied()
        .unwrap_or(Color::Gray);
    Monogram { letter, color }
}

/// Rolling string hash over UTF-16 code units.
///
/// Each step computes `unit + ((hash << 5) - hash)` where the shift acts on
/// the low 32 bits of the running value (wrapping) and the subtraction and
/// addition do not wrap. Colors picked from it stay stable across versions
/// and match the web rendition of the same catalog.
pub fn title_hash(title: &str) -> i64 {
    title.encode_utf16().fold(0i64, |hash, unit| {
        let shifted = i64::from((hash as i32).wrapping_shl(5));
        i64::from(unit) + shifted - hash
    })
}

/// Palette index for a title: `|hash| mod len`. Zero for an empty palette.
pub fn color_index(title: &str, palette_len: usize) -> usize {
    if palette_len == 0 {
        return 0;
    }
    (title_hash(title).unsigned_abs() % palette_len as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const LONG: &str = "A very long title that overflows the int32 range for sure 😀";

    #[test]
    fn test_card_palette_vectors() {
        for (title, expected) in [
            ("A", 5),
            ("Foo", 10),
            ("Bar", 7),
            ("GitHub", 1),
            ("百度", 0),
            ("", 0),
            ("Tencent Video", 0),
            (LONG, 8),
        ] {
            assert_eq!(color_index(title, CARD_PALETTE.len()), expected, "{title:?}");
        }
    }

    #[test]
    fn test_search_palette_vectors() {
        for (title, expected) in [
            ("A", 1),
            ("Foo", 6),
            ("Bar", 3),
            ("GitHub", 5),
            ("百度", 0),
            ("", 0),
            ("Tencent Video", 0),
            (LONG, 4),
        ] {
            assert_eq!(color_index(title, SEARCH_PALETTE.len()), expected, "{title:?}");
        }
    }

    #[test]
    fn test_search_palette_is_card_prefix() {
        assert_eq!(&CARD_PALETTE[..8], &SEARCH_PALETTE[..]);
    }

    #[test]
    fn test_monogram_letter() {
        assert_eq!(monogram("github", &CARD_PALETTE).letter, "G");
        assert_eq!(monogram("百度", &CARD_PALETTE).letter, "百");
        assert_eq!(monogram("", &CARD_PALETTE).letter, "?");
    }

    #[test]
    fn test_monogram_color_from_palette() {
        let m = monogram("Foo", &CARD_PALETTE);
        assert_eq!(m.color, CARD_PALETTE[10]);
        let m = monogram("Foo", &SEARCH_PALETTE);
        assert_eq!(m.color, SEARCH_PALETTE[6]);
    }

    proptest! {
        #[test]
        fn prop_color_index_in_range(title in ".{0,80}", len in 1usize..20) {
            prop_assert!(color_index(&title, len) < len);
        }

        #[test]
        fn prop_hash_is_deterministic(title in ".{0,40}") {
            prop_assert_eq!(title_hash(&title), title_hash(&title));
        }
    }
}
