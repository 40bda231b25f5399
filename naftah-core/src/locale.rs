//! Message bundle for the error taxonomy (§4.H): "all messages are formatted from a
//! resource bundle keyed by kind; the default bundle is Arabic."
//!
//! Uses a compile-time perfect hash map per kind, the same pattern the teacher's
//! function registry (`functions.rs`) uses for its name -> metadata table.

use phf::phf_map;

use crate::error::ErrorKind;

/// Locale tag recognized by `naftah.locale` (§6). Only Arabic (default) and an English
/// fallback bundle ship built in; embedders can still set `naftah.locale` to request the
/// fallback for environments where no Arabic bundle is desired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    Arabic,
    English,
}

impl Locale {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en-gb" | "english" => Locale::English,
            _ => Locale::Arabic,
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::Arabic
    }
}

static ARABIC_MESSAGES: phf::Map<&'static str, &'static str> = phf_map! {
    "Syntax" => "خطأ نحوي",
    "Lexical" => "خطأ لغوي",
    "VariableNotFound" => "المتغير غير موجود",
    "ConstantReassignment" => "إعادة إسناد لثابت",
    "TypeMismatch" => "عدم تطابق النوع",
    "Assignability" => "القيمة لا تلائم النوع المعلن",
    "NullInput" => "مدخل فارغ غير مسموح",
    "EmptyArgument" => "وسيط مفقود",
    "DivisionByZero" => "قسمة على صفر",
    "Overflow" => "تجاوز سعة العدد",
    "UnsupportedBitwiseDecimal" => "لا يمكن تطبيق عملية ثنائية على عدد عشري",
    "InvalidNumber" => "عدد غير صالح",
    "InvalidRadix" => "أساس عددي غير صالح",
    "IndexOutOfBounds" => "فهرس خارج الحدود",
    "KeyNotFound" => "المفتاح غير موجود",
    "NegativeNumber" => "عدد سالب غير مسموح به هنا",
    "InvocableNotFound" => "لا يوجد دالة أو دالة مطابقة",
    "AmbiguousOverload" => "تحميل زائد غامض",
    "ArityMismatch" => "عدد الوسائط غير مطابق",
    "InvalidLoopLabel" => "وسم حلقة غير صالح",
    "OrphanSignal" => "إشارة تحكم يتيمة",
    "AlreadySpawned" => "المهمة مشغّلة مسبقاً",
    "Cancelled" => "أُلغيت المهمة",
    "Timeout" => "انتهت المهلة",
    "ChannelClosed" => "القناة مغلقة",
    "NaNValue" => "قيمة ليست رقماً",
    "InfiniteDecimal" => "قيمة عشرية لا نهائية",
    "HostInvocation" => "فشل استدعاء كائن مضيف",
    "Internal" => "خطأ داخلي",
};

static ENGLISH_MESSAGES: phf::Map<&'static str, &'static str> = phf_map! {
    "Syntax" => "syntax error",
    "Lexical" => "lexical error",
    "VariableNotFound" => "variable not found",
    "ConstantReassignment" => "constant reassignment",
    "TypeMismatch" => "type mismatch",
    "Assignability" => "value is not assignable to the declared type",
    "NullInput" => "null input not permitted",
    "EmptyArgument" => "missing argument",
    "DivisionByZero" => "division by zero",
    "Overflow" => "numeric overflow",
    "UnsupportedBitwiseDecimal" => "bitwise operation on a decimal operand",
    "InvalidNumber" => "invalid number",
    "InvalidRadix" => "invalid radix",
    "IndexOutOfBounds" => "index out of bounds",
    "KeyNotFound" => "key not found",
    "NegativeNumber" => "negative number not permitted here",
    "InvocableNotFound" => "no matching function or method",
    "AmbiguousOverload" => "ambiguous overload",
    "ArityMismatch" => "argument count mismatch",
    "InvalidLoopLabel" => "invalid loop label",
    "OrphanSignal" => "orphan control signal",
    "AlreadySpawned" => "task already spawned",
    "Cancelled" => "task cancelled",
    "Timeout" => "timed out",
    "ChannelClosed" => "channel closed",
    "NaNValue" => "value is not a number",
    "InfiniteDecimal" => "infinite decimal value",
    "HostInvocation" => "host invocation failed",
    "Internal" => "internal error",
};

fn kind_key(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Syntax => "Syntax",
        ErrorKind::Lexical => "Lexical",
        ErrorKind::VariableNotFound => "VariableNotFound",
        ErrorKind::ConstantReassignment => "ConstantReassignment",
        ErrorKind::TypeMismatch => "TypeMismatch",
        ErrorKind::Assignability => "Assignability",
        ErrorKind::NullInput => "NullInput",
        ErrorKind::EmptyArgument => "EmptyArgument",
        ErrorKind::DivisionByZero => "DivisionByZero",
        ErrorKind::Overflow => "Overflow",
        ErrorKind::UnsupportedBitwiseDecimal => "UnsupportedBitwiseDecimal",
        ErrorKind::InvalidNumber => "InvalidNumber",
        ErrorKind::InvalidRadix => "InvalidRadix",
        ErrorKind::IndexOutOfBounds => "IndexOutOfBounds",
        ErrorKind::KeyNotFound => "KeyNotFound",
        ErrorKind::NegativeNumber => "NegativeNumber",
        ErrorKind::InvocableNotFound => "InvocableNotFound",
        ErrorKind::AmbiguousOverload => "AmbiguousOverload",
        ErrorKind::ArityMismatch => "ArityMismatch",
        ErrorKind::InvalidLoopLabel => "InvalidLoopLabel",
        ErrorKind::OrphanSignal => "OrphanSignal",
        ErrorKind::AlreadySpawned => "AlreadySpawned",
        ErrorKind::Cancelled => "Cancelled",
        ErrorKind::Timeout => "Timeout",
        ErrorKind::ChannelClosed => "ChannelClosed",
        ErrorKind::NaNValue => "NaNValue",
        ErrorKind::InfiniteDecimal => "InfiniteDecimal",
        ErrorKind::HostInvocation => "HostInvocation",
        ErrorKind::Internal => "Internal",
    }
}

/// Look up the message template for `kind` in the given locale's bundle.
pub fn message(locale: Locale, kind: ErrorKind) -> &'static str {
    let key = kind_key(kind);
    let bundle = match locale {
        Locale::Arabic => &ARABIC_MESSAGES,
        Locale::English => &ENGLISH_MESSAGES,
    };
    bundle.get(key).copied().unwrap_or("?")
}

/// Prefix used to mark `Internal` (programmer-error) messages, per §4.H / §7.
pub fn internal_prefix(locale: Locale) -> &'static str {
    match locale {
        Locale::Arabic => "[خطأ برمجي]",
        Locale::English => "[bug]",
    }
}

/// Eastern-Arabic digit glyphs (U+0660..U+0669), used by §4.F.6 interpolation formatting
/// and by the temporal parser's digit normalization (§4.I).
pub const EASTERN_ARABIC_DIGITS: [char; 10] =
    ['٠', '١', '٢', '٣', '٤', '٥', '٦', '٧', '٨', '٩'];

/// Arabic decimal separator used when formatting `DynNum` for interpolation (§4.F.6).
pub const ARABIC_DECIMAL_SEPARATOR: char = '٫';

/// Render an ASCII-digit numeric string using Eastern-Arabic glyphs, preserving any
/// decimal point (replaced with the Arabic separator) and sign.
pub fn arabic_digits(ascii: &str) -> String {
    let mut out = String::with_capacity(ascii.len());
    for c in ascii.chars() {
        match c {
            '0'..='9' => {
                let idx = c as usize - '0' as usize;
                out.push(EASTERN_ARABIC_DIGITS[idx]);
            }
            '.' => out.push(ARABIC_DECIMAL_SEPARATOR),
            other => out.push(other),
        }
    }
    out
}

/// Maps an Eastern-Arabic digit back to its Western digit, if `c` is one.
pub fn western_digit(c: char) -> Option<char> {
    EASTERN_ARABIC_DIGITS
        .iter()
        .position(|&d| d == c)
        .map(|idx| (b'0' + idx as u8) as char)
}

/// `translit`: pure Arabic-digit -> Western-digit normalization used before numeric
/// parsing. The broader Arabic<->Latin transliteration tables (§1 exclusions) are out of
/// scope; this is only the digit-equivalence function §8 property 6 requires.
pub fn translit_digits(s: &str) -> String {
    s.chars()
        .map(|c| western_digit(c).unwrap_or(c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arabic_is_default() {
        assert_eq!(Locale::default(), Locale::Arabic);
    }

    #[test]
    fn digit_round_trip() {
        let eastern = arabic_digits("10000.006");
        assert_eq!(translit_digits(&eastern), "10000.006");
    }

    #[test]
    fn unknown_locale_tag_falls_back_to_arabic() {
        assert_eq!(Locale::from_tag("fr-FR"), Locale::Arabic);
    }
}
