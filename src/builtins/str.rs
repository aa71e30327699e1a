//! String type - immutable UTF-8 buffers
//!
//! Design: Built on the inline immutable buffer (one pointer-free
//! allocation); every "mutating" operation constructs a new string.
//! Also hosts the numeric-to-string conversions and the format-spec
//! mini-language they consume.

use crate::buffer::InlineBuf;
use crate::builtins::list::List;
use crate::exc::{raise, ExcKind};
use crate::slot::Slot;

/// Immutable UTF-8 string over an inline buffer.
#[repr(transparent)]
pub struct Str {
    raw: InlineBuf<u8>,
}

impl Str {
    /// Create from raw bytes (assumed valid UTF-8 by the compiler's
    /// string-literal contract).
    pub fn new(bytes: &[u8]) -> *mut Str {
        InlineBuf::create(bytes) as *mut Str
    }

    pub fn from_rust(s: &str) -> *mut Str {
        Self::new(s.as_bytes())
    }

    #[inline]
    pub fn len(&self) -> i64 {
        self.raw.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.raw.as_slice()
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        unsafe { core::str::from_utf8_unchecked(self.as_bytes()) }
    }

    pub fn concat(&self, other: &Str) -> *mut Str {
        self.raw.concat(&other.raw) as *mut Str
    }

    pub fn repeat(&self, n: i64) -> *mut Str {
        self.raw.repeat(n) as *mut Str
    }

    pub fn cmp(&self, other: &Str) -> i64 {
        self.raw.cmp(&other.raw)
    }

    pub fn eq(&self, other: &Str) -> bool {
        self.raw.eq(&other.raw)
    }

    pub fn contains(&self, needle: &Str) -> bool {
        self.raw.contains_sub(&needle.raw)
    }

    /// One-character string at `index` (negative counts from the end).
    pub fn get_char(&self, index: i64) -> *mut Str {
        let mut i = index;
        if i < 0 {
            i += self.len();
        }
        if i < 0 || i >= self.len() {
            raise(ExcKind::IndexError, "string index out of range");
        }
        Str::new(&self.as_bytes()[i as usize..i as usize + 1])
    }

    /// Copy with leading/trailing ASCII whitespace removed.
    pub fn strip(&self) -> *mut Str {
        const WS: &[u8] = b" \t\n\r\x0c\x0b";
        let bytes = self.as_bytes();
        let mut start = 0;
        let mut end = bytes.len();
        while start < end && WS.contains(&bytes[start]) {
            start += 1;
        }
        while end > start && WS.contains(&bytes[end - 1]) {
            end -= 1;
        }
        Str::new(&bytes[start..end])
    }

    /// Split on a separator into a list of string pointers.
    /// An empty separator raises ValueError.
    pub fn split(&self, sep: &Str) -> *mut List {
        if sep.is_empty() {
            raise(ExcKind::ValueError, "empty separator");
        }
        let hay = self.as_bytes();
        let pat = sep.as_bytes();
        let out = List::empty();
        let mut i = 0;
        let mut last = 0;
        while i + pat.len() <= hay.len() {
            if &hay[i..i + pat.len()] == pat {
                unsafe { (*out).append(Slot::from_ptr(Str::new(&hay[last..i]))) };
                i += pat.len();
                last = i;
            } else {
                i += 1;
            }
        }
        unsafe { (*out).append(Slot::from_ptr(Str::new(&hay[last..]))) };
        out
    }

    /// Join a list of string pointers with `self` as the separator.
    pub fn join(&self, parts: &List) -> *mut Str {
        if parts.len() == 0 {
            return Str::new(b"");
        }
        let mut out = Vec::new();
        for (i, slot) in parts.as_slice().iter().enumerate() {
            if i > 0 {
                out.extend_from_slice(self.as_bytes());
            }
            let part = unsafe { &*slot.as_ptr::<Str>() };
            out.extend_from_slice(part.as_bytes());
        }
        Str::new(&out)
    }

    /// FNV-1a over the bytes.
    pub fn hash(&self) -> i64 {
        let mut h: u64 = 0xcbf29ce484222325;
        for &b in self.as_bytes() {
            h ^= b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        h as i64
    }

    /// Quoted, escaped representation: prefers single quotes, switches
    /// to double quotes when the content has a `'` but no `"`.
    pub fn repr(&self) -> *mut Str {
        let bytes = self.as_bytes();
        let has_sq = bytes.contains(&b'\'');
        let has_dq = bytes.contains(&b'"');
        let quote = if has_sq && !has_dq { b'"' } else { b'\'' };

        let mut out = Vec::with_capacity(bytes.len() + 2);
        out.push(quote);
        for &c in bytes {
            match c {
                b'\\' => out.extend_from_slice(b"\\\\"),
                b'\t' => out.extend_from_slice(b"\\t"),
                b'\n' => out.extend_from_slice(b"\\n"),
                b'\r' => out.extend_from_slice(b"\\r"),
                c if c == quote => {
                    out.push(b'\\');
                    out.push(c);
                }
                0x20..=0x7e => out.push(c),
                c => {
                    const HEX: &[u8; 16] = b"0123456789abcdef";
                    out.extend_from_slice(b"\\x");
                    out.push(HEX[(c >> 4) as usize]);
                    out.push(HEX[(c & 0xf) as usize]);
                }
            }
        }
        out.push(quote);
        Str::new(&out)
    }
}

/* ── numeric conversion ──────────────────────────────────────────── */

pub fn from_int(val: i64) -> *mut Str {
    Str::from_rust(&val.to_string())
}

/// Default float conversion: shortest form at 12 significant digits,
/// with ".0" appended when the result would read as an integer.
pub fn from_float(val: f64) -> *mut Str {
    let mut s = format_general(val, 12);
    if !s.contains(['.', 'e', 'n', 'i']) {
        s.push_str(".0");
    }
    Str::from_rust(&s)
}

pub fn from_bool(val: bool) -> *mut Str {
    Str::from_rust(if val { "True" } else { "False" })
}

/* ── format-spec mini-language ───────────────────────────────────── */

/// Parsed numeric format specification:
/// `[0][width][.precision][type]` where type is one character.
struct FormatSpec {
    zero_pad: bool,
    width: Option<usize>,
    precision: Option<usize>,
    ty: Option<u8>,
}

/// Parse the spec grammar. Returns None when the input does not fully
/// parse, in which case formatters fall back to the default conversion.
fn parse_format_spec(spec: &[u8]) -> Option<FormatSpec> {
    let mut out = FormatSpec { zero_pad: false, width: None, precision: None, ty: None };
    let mut i = 0;

    if i < spec.len() && spec[i] == b'0' {
        out.zero_pad = true;
        i += 1;
    }

    let mut width = 0usize;
    let mut has_width = false;
    while i < spec.len() && spec[i].is_ascii_digit() {
        has_width = true;
        width = (width * 10 + (spec[i] - b'0') as usize).min(1_000_000);
        i += 1;
    }
    if has_width {
        out.width = Some(width);
    }

    if i < spec.len() && spec[i] == b'.' {
        i += 1;
        let mut precision = 0usize;
        let mut saw_digit = false;
        while i < spec.len() && spec[i].is_ascii_digit() {
            saw_digit = true;
            precision = (precision * 10 + (spec[i] - b'0') as usize).min(1_000_000);
            i += 1;
        }
        if !saw_digit {
            return None;
        }
        out.precision = Some(precision);
    }

    if i < spec.len() {
        out.ty = Some(spec[i]);
        i += 1;
    }

    if i != spec.len() {
        return None;
    }
    Some(out)
}

/// C `%g`-style conversion: fixed or exponential form by magnitude,
/// trailing zeros stripped, two-digit signed exponent.
fn format_general(val: f64, precision: usize) -> String {
    if val.is_nan() {
        return "nan".to_string();
    }
    if val.is_infinite() {
        return if val < 0.0 { "-inf".to_string() } else { "inf".to_string() };
    }
    let p = precision.max(1);
    let e_form = format!("{:.*e}", p - 1, val);
    let epos = e_form.find('e').unwrap_or(e_form.len() - 1);
    let exp: i32 = e_form[epos + 1..].parse().unwrap_or(0);

    if exp < -4 || exp >= p as i32 {
        let mantissa = trim_trailing_zeros(&e_form[..epos]);
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exp.abs())
    } else {
        let frac_digits = (p as i32 - 1 - exp).max(0) as usize;
        trim_trailing_zeros(&format!("{:.*}", frac_digits, val))
    }
}

fn trim_trailing_zeros(s: &str) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s.to_string()
    }
}

/// Right-justify to `width`; zero padding goes after the sign and only
/// applies to finite numeric text.
fn pad_numeric(s: String, width: usize, zero_pad: bool) -> String {
    if s.len() >= width {
        return s;
    }
    let pad = width - s.len();
    let numeric = s.bytes().all(|c| c.is_ascii_digit() || matches!(c, b'-' | b'+' | b'.' | b'e'));
    if zero_pad && numeric {
        if let Some(rest) = s.strip_prefix('-') {
            format!("-{}{}", "0".repeat(pad), rest)
        } else {
            format!("{}{}", "0".repeat(pad), s)
        }
    } else {
        format!("{}{}", " ".repeat(pad), s)
    }
}

/// Format an integer under the spec grammar; anything the grammar does
/// not accept for integers (precision, non-`d` type, unparsable spec)
/// falls back to the default conversion.
pub fn format_int(val: i64, spec: &Str) -> *mut Str {
    let parsed = match parse_format_spec(spec.as_bytes()) {
        Some(p) => p,
        None => return from_int(val),
    };
    if parsed.ty.is_some() && parsed.ty != Some(b'd') {
        return from_int(val);
    }
    if parsed.precision.is_some() {
        return from_int(val);
    }
    let body = val.to_string();
    let out = match parsed.width {
        Some(w) => pad_numeric(body, w, parsed.zero_pad),
        None => body,
    };
    Str::from_rust(&out)
}

/// Format a float under the spec grammar; `f` is fixed-point, `g`
/// (the default) is general form. Unparsable specs and unknown types
/// fall back to the default conversion.
pub fn format_float(val: f64, spec: &Str) -> *mut Str {
    let parsed = match parse_format_spec(spec.as_bytes()) {
        Some(p) => p,
        None => return from_float(val),
    };
    if parsed.ty.is_none() && parsed.width.is_none() && parsed.precision.is_none() && !parsed.zero_pad {
        return from_float(val);
    }
    let ty = parsed.ty.unwrap_or(b'g');
    if ty != b'f' && ty != b'g' {
        return from_float(val);
    }

    let body = if ty == b'f' {
        let p = parsed.precision.unwrap_or(6);
        if val.is_nan() {
            "nan".to_string()
        } else if val.is_infinite() {
            if val < 0.0 { "-inf".to_string() } else { "inf".to_string() }
        } else {
            format!("{:.*}", p, val)
        }
    } else {
        let p = parsed.precision.unwrap_or(6).max(1);
        format_general(val, p)
    };

    let out = match parsed.width {
        Some(w) => pad_numeric(body, w, parsed.zero_pad),
        None => body,
    };
    Str::from_rust(&out)
}

/// C FFI exports
#[no_mangle]
pub unsafe extern "C" fn vesper_str_new(data: *const u8, len: i64) -> *mut Str {
    if data.is_null() || len <= 0 {
        return Str::new(b"");
    }
    Str::new(core::slice::from_raw_parts(data, len as usize))
}

#[no_mangle]
pub unsafe extern "C" fn vesper_str_len(s: *const Str) -> i64 {
    (*s).len()
}

#[no_mangle]
pub unsafe extern "C" fn vesper_str_concat(a: *const Str, b: *const Str) -> *mut Str {
    (*a).concat(&*b)
}

#[no_mangle]
pub unsafe extern "C" fn vesper_str_repeat(s: *const Str, n: i64) -> *mut Str {
    (*s).repeat(n)
}

#[no_mangle]
pub unsafe extern "C-unwind" fn vesper_str_get(s: *const Str, index: i64) -> *mut Str {
    (*s).get_char(index)
}

#[no_mangle]
pub unsafe extern "C" fn vesper_str_cmp(a: *const Str, b: *const Str) -> i64 {
    (*a).cmp(&*b)
}

#[no_mangle]
pub unsafe extern "C" fn vesper_str_eq(a: *const Str, b: *const Str) -> i64 {
    (*a).eq(&*b) as i64
}

#[no_mangle]
pub unsafe extern "C" fn vesper_str_contains(hay: *const Str, needle: *const Str) -> i64 {
    (*hay).contains(&*needle) as i64
}

#[no_mangle]
pub unsafe extern "C" fn vesper_str_strip(s: *const Str) -> *mut Str {
    (*s).strip()
}

#[no_mangle]
pub unsafe extern "C-unwind" fn vesper_str_split(s: *const Str, sep: *const Str) -> *mut List {
    (*s).split(&*sep)
}

#[no_mangle]
pub unsafe extern "C" fn vesper_str_join(sep: *const Str, parts: *const List) -> *mut Str {
    (*sep).join(&*parts)
}

#[no_mangle]
pub unsafe extern "C" fn vesper_str_hash(s: *const Str) -> i64 {
    (*s).hash()
}

#[no_mangle]
pub unsafe extern "C" fn vesper_str_repr(s: *const Str) -> *mut Str {
    (*s).repr()
}

#[no_mangle]
pub extern "C" fn vesper_str_from_int(val: i64) -> *mut Str {
    from_int(val)
}

#[no_mangle]
pub extern "C" fn vesper_str_from_float(val: f64) -> *mut Str {
    from_float(val)
}

#[no_mangle]
pub extern "C" fn vesper_str_from_bool(val: i64) -> *mut Str {
    from_bool(val != 0)
}

#[no_mangle]
pub unsafe extern "C" fn vesper_str_format_int(val: i64, spec: *const Str) -> *mut Str {
    format_int(val, &*spec)
}

#[no_mangle]
pub unsafe extern "C" fn vesper_str_format_float(val: f64, spec: *const Str) -> *mut Str {
    format_float(val, &*spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exc::{catch, ExcKind};

    fn s(text: &str) -> &'static Str {
        unsafe { &*Str::from_rust(text) }
    }

    fn str_of(ptr: *mut Str) -> &'static str {
        unsafe { (*ptr).as_str() }
    }

    #[test]
    fn test_basic_ops() {
        assert_eq!(s("hello").len(), 5);
        assert_eq!(str_of(s("foo").concat(s("bar"))), "foobar");
        assert_eq!(str_of(s("ab").repeat(3)), "ababab");
        assert_eq!(str_of(s("ab").repeat(0)), "");
        assert!(s("abc").eq(s("abc")));
        assert_eq!(s("abc").cmp(s("abd")), -1);
        assert!(s("hello world").contains(s("lo w")));
        assert!(s("x").contains(s("")));
    }

    #[test]
    fn test_get_char() {
        assert_eq!(str_of(s("abc").get_char(0)), "a");
        assert_eq!(str_of(s("abc").get_char(-1)), "c");
        let err = catch(|| s("abc").get_char(3)).unwrap_err();
        assert_eq!(err.kind, ExcKind::IndexError);
        let err = catch(|| s("abc").get_char(-4)).unwrap_err();
        assert_eq!(err.kind, ExcKind::IndexError);
    }

    #[test]
    fn test_strip() {
        assert_eq!(str_of(s("  hi \t\n").strip()), "hi");
        assert_eq!(str_of(s("\r\n").strip()), "");
        assert_eq!(str_of(s("x").strip()), "x");
    }

    #[test]
    fn test_split_and_join() {
        let parts = unsafe { &*s("a,b,,c").split(s(",")) };
        let texts: Vec<&str> = parts
            .as_slice()
            .iter()
            .map(|slot| unsafe { (*slot.as_ptr::<Str>()).as_str() })
            .collect();
        assert_eq!(texts, vec!["a", "b", "", "c"]);

        assert_eq!(str_of(s(", ").join(parts)), "a, b, , c");

        let err = catch(|| s("abc").split(s(""))).unwrap_err();
        assert_eq!(err.kind, ExcKind::ValueError);
    }

    #[test]
    fn test_hash_consistency() {
        assert_eq!(s("spam").hash(), s("spam").hash());
        assert_ne!(s("spam").hash(), s("eggs").hash());
        // FNV-1a offset basis for the empty string
        assert_eq!(s("").hash(), 0xcbf29ce484222325u64 as i64);
    }

    #[test]
    fn test_from_float_appends_point_zero() {
        assert_eq!(str_of(from_float(1.0)), "1.0");
        assert_eq!(str_of(from_float(2.5)), "2.5");
        assert_eq!(str_of(from_float(f64::NAN)), "nan");
        assert_eq!(str_of(from_float(f64::INFINITY)), "inf");
        assert_eq!(str_of(from_float(-1e30)), "-1e+30");
    }

    #[test]
    fn test_from_bool() {
        assert_eq!(str_of(from_bool(true)), "True");
        assert_eq!(str_of(from_bool(false)), "False");
    }

    #[test]
    fn test_format_int() {
        assert_eq!(str_of(format_int(42, s(""))), "42");
        assert_eq!(str_of(format_int(42, s("5"))), "   42");
        assert_eq!(str_of(format_int(42, s("05"))), "00042");
        assert_eq!(str_of(format_int(-42, s("05"))), "-0042");
        assert_eq!(str_of(format_int(42, s("5d"))), "   42");
        // Fallbacks: precision, wrong type, garbage
        assert_eq!(str_of(format_int(42, s("5.2"))), "42");
        assert_eq!(str_of(format_int(42, s("5x"))), "42");
        assert_eq!(str_of(format_int(42, s("5dd"))), "42");
    }

    #[test]
    fn test_format_float() {
        assert_eq!(str_of(format_float(3.14159, s(".2f"))), "3.14");
        assert_eq!(str_of(format_float(3.14159, s("8.2f"))), "    3.14");
        assert_eq!(str_of(format_float(3.14159, s("08.2f"))), "00003.14");
        assert_eq!(str_of(format_float(1.5, s("f"))), "1.500000");
        assert_eq!(str_of(format_float(1234.5678, s(".6g"))), "1234.57");
        assert_eq!(str_of(format_float(0.5, s(".3g"))), "0.5");
        // Empty and malformed specs fall back
        assert_eq!(str_of(format_float(1.0, s(""))), "1.0");
        assert_eq!(str_of(format_float(1.0, s("8.q"))), "1.0");
        assert_eq!(str_of(format_float(1.0, s("zz"))), "1.0");
    }

    #[test]
    fn test_repr() {
        assert_eq!(str_of(s("hi").repr()), "'hi'");
        assert_eq!(str_of(s("it's").repr()), "\"it's\"");
        assert_eq!(str_of(s("a\tb\nc").repr()), "'a\\tb\\nc'");
        assert_eq!(str_of(s("\x01").repr()), "'\\x01'");
        // Both quote kinds present: single quotes win, inner ones escaped
        assert_eq!(str_of(s("'\"").repr()), "'\\'\"'");
    }
}
