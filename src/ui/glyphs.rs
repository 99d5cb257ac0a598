/// Symbols used to mark entry state in the entry list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyphs {
    pub pending: &'static str,
    pub valid: &'static str,
    pub invalid: &'static str,
    pub forward: &'static str,
    pub reversed: &'static str,
    pub not_found: &'static str,
    pub cursor: &'static str,
}

pub fn select(fancy_requested: bool) -> Glyphs {
    if fancy_requested {
        fancy()
    } else {
        ascii()
    }
}

fn ascii() -> Glyphs {
    Glyphs {
        pending: "..",
        valid: "ok",
        invalid: "!!",
        forward: "->",
        reversed: "<-",
        not_found: "--",
        cursor: ">",
    }
}

fn fancy() -> Glyphs {
    Glyphs {
        pending: "⋯ ",
        valid: "✓ ",
        invalid: "✗ ",
        forward: "→ ",
        reversed: "← ",
        not_found: "∅ ",
        cursor: "▶",
    }
}
