//! Swedish ordering for display strings.
//!
//! Three levels, like a UCA tailoring: base letters first (`å`, `ä`, `ö`
//! after `z`), then accents, then case with lowercase first.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Class {
    Space,
    Symbol,
    Digit,
    Letter,
}

#[derive(Debug, Clone, Copy)]
struct Weight {
    primary: (Class, u32),
    secondary: u8,
    tertiary: u8,
}

/// Compare two strings the way a Swedish locale sorts them.
#[must_use]
pub fn swedish_cmp(a: &str, b: &str) -> Ordering {
    let wa: Vec<Weight> = a.chars().map(weigh).collect();
    let wb: Vec<Weight> = b.chars().map(weigh).collect();

    wa.iter()
        .map(|w| w.primary)
        .cmp(wb.iter().map(|w| w.primary))
        .then_with(|| wa.iter().map(|w| w.secondary).cmp(wb.iter().map(|w| w.secondary)))
        .then_with(|| wa.iter().map(|w| w.tertiary).cmp(wb.iter().map(|w| w.tertiary)))
        .then_with(|| a.cmp(b))
}

fn weigh(c: char) -> Weight {
    let lower = c.to_lowercase().next().unwrap_or(c);
    let tertiary = u8::from(c != lower);

    if c.is_whitespace() {
        return Weight {
            primary: (Class::Space, 0),
            secondary: 0,
            tertiary: 0,
        };
    }
    if let Some(digit) = c.to_digit(10) {
        return Weight {
            primary: (Class::Digit, digit),
            secondary: 0,
            tertiary: 0,
        };
    }
    if !lower.is_alphabetic() {
        return Weight {
            primary: (Class::Symbol, u32::from(c)),
            secondary: 0,
            tertiary: 0,
        };
    }

    let (base, secondary) = fold(lower);
    let rank = match base {
        'a'..='z' => u32::from(base) - u32::from('a'),
        'å' => 26,
        'ä' => 27,
        'ö' => 28,
        other => 100 + u32::from(other),
    };
    Weight {
        primary: (Class::Letter, rank),
        secondary,
        tertiary,
    }
}

fn fold(c: char) -> (char, u8) {
    match c {
        'à' | 'á' | 'â' | 'ã' => ('a', 1),
        'æ' => ('ä', 1),
        'ø' => ('ö', 1),
        'ç' => ('c', 1),
        'è' | 'é' | 'ê' | 'ë' => ('e', 1),
        'ì' | 'í' | 'î' | 'ï' => ('i', 1),
        'ñ' => ('n', 1),
        'ò' | 'ó' | 'ô' | 'õ' => ('o', 1),
        'ù' | 'ú' | 'û' => ('u', 1),
        'ü' | 'ý' | 'ÿ' => ('y', 1),
        other => (other, 0),
    }
}
