//! Line-oriented comment and literal-string tracking.
//!
//! The scanner never tokenizes PostScript properly. It only needs to know,
//! for every byte position, whether a structural token starting there could
//! be real or is hidden inside a `%%` comment or a `( ... )` string.

/// Comment and string nesting state carried from byte to byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexState {
    pub in_comment: bool,
    pub quote_depth: u32,
}

impl LexState {
    /// Advance over the byte `b0` at the current position, with `b1` the
    /// byte following it.
    ///
    /// Returns `true` when a structural token may start at this position.
    /// A newline ends both comments and unbalanced strings. A `)` only
    /// closes a string when the byte before it is not a backslash.
    pub fn step(&mut self, b0: u8, b1: u8) -> bool {
        if b0 == b'\n' {
            self.quote_depth = 0;
            self.in_comment = false;
        }
        if self.in_comment {
            return false;
        }
        if b0 == b'(' {
            self.quote_depth += 1;
        }
        if b0 != b'\\' && b1 == b')' && self.quote_depth > 0 {
            self.quote_depth -= 1;
        }
        if self.quote_depth > 0 {
            return false;
        }
        // A `%%` inside a string is string data, so this is only reached
        // outside of one.
        if b0 == b'%' && b1 == b'%' {
            self.in_comment = true;
        }
        true
    }
}

/// Space, tab or newline.
pub fn is_blank(b: u8) -> bool {
    matches!(b, b' ' | b'\n' | b'\t')
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Run `step` over `data`, returning which positions allowed tokens.
    fn open_positions(data: &[u8]) -> Vec<bool> {
        let mut state = LexState::default();
        (0..data.len())
            .map(|i| state.step(data[i], data.get(i + 1).copied().unwrap_or(0)))
            .collect()
    }

    #[test]
    fn strings_suppress_until_closed() {
        let open = open_positions(b"a(bc)d");
        assert_eq!(open, vec![true, false, false, true, true, true]);
    }

    #[test]
    fn nested_strings() {
        let mut state = LexState::default();
        for (i, b) in b"((x".iter().enumerate() {
            state.step(*b, b"((x\n"[i + 1]);
        }
        assert_eq!(state.quote_depth, 2);
    }

    #[test]
    fn escaped_paren_does_not_close() {
        let open = open_positions(b"(a\\)b)c");
        assert_eq!(open, vec![false, false, false, false, true, true, true]);
    }

    #[test]
    fn comment_lasts_until_newline() {
        let open = open_positions(b"%%x y\nz");
        assert_eq!(open, vec![true, false, false, false, false, true, true]);
    }

    #[test]
    fn newline_resets_unbalanced_string() {
        let mut state = LexState::default();
        state.step(b'(', b'a');
        assert_eq!(state.quote_depth, 1);
        assert!(state.step(b'\n', b'b'));
        assert_eq!(state, LexState::default());
    }

    #[test]
    fn percent_inside_string_is_data() {
        let mut state = LexState::default();
        for (i, b) in b"(%%".iter().enumerate() {
            state.step(*b, b"(%%x"[i + 1]);
        }
        assert!(!state.in_comment);
    }

    #[test]
    fn blanks() {
        assert!(is_blank(b' '));
        assert!(is_blank(b'\t'));
        assert!(is_blank(b'\n'));
        assert!(!is_blank(b'\r'));
        assert!(!is_blank(b'x'));
    }
}
