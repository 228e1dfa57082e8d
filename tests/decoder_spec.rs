use tlg_reader::tlg::format::opcode::{self, Delta, Opcode};
use tlg_reader::tlg::format::work_id::{self, WorkId};
use tlg_reader::tlg::state::CitationState;
use tlg_reader::tlg::utils::{normalize_id, ByteCursor};
use tlg_reader::{BetaCode, Level, Transliterator};

#[test]
fn seven_bit_integers_pack_big_endian() {
    let mut cur = ByteCursor::new(&[0x85]);
    assert_eq!(cur.read_bin(1), 5);

    // 327 = 2 * 128 + 71
    let mut cur = ByteCursor::new(&[0x82, 0xC7]);
    assert_eq!(cur.read_bin(2), 327);
}

#[test]
fn strings_terminate_on_ff() {
    let mut cur = ByteCursor::new(&[0xE1, 0xE2, 0xFF, 0x85]);
    assert_eq!(cur.read_str(), "ab");
    // Terminator consumed; the next byte is still available.
    assert_eq!(cur.read_bin(1), 5);
}

#[test]
fn truncated_reads_yield_partial_values() {
    let mut cur = ByteCursor::new(&[0x81]);
    assert_eq!(cur.read_bin(2), 1);

    let mut cur = ByteCursor::new(&[]);
    assert_eq!(cur.read_char(), ' ');

    let mut cur = ByteCursor::new(&[0xE1, 0xE2]);
    assert_eq!(cur.read_str(), "ab");
}

#[test]
fn left_nibble_selects_the_level() {
    let cases = [
        (0x81u8, Level::Z),
        (0x91, Level::Y),
        (0xA1, Level::X),
        (0xB1, Level::W),
        (0xC1, Level::V),
        (0xD1, Level::N),
    ];
    for (byte, level) in cases {
        let bytes = [byte];
        let mut cur = ByteCursor::new(&bytes);
        assert_eq!(
            opcode::decode(&mut cur),
            Opcode::Update {
                level: Some(level),
                delta: Delta::Binary(1)
            },
            "opcode {:#04x}",
            byte
        );
    }
}

#[test]
fn escape_selector_names_the_low_levels() {
    let cases = [
        (0x80u8, Level::A),
        (0x81, Level::B),
        (0x82, Level::C),
        (0x84, Level::D),
    ];
    for (selector, level) in cases {
        let bytes = [0xE1, selector];
        let mut cur = ByteCursor::new(&bytes);
        assert_eq!(
            opcode::decode(&mut cur),
            Opcode::Update {
                level: Some(level),
                delta: Delta::Binary(1)
            },
            "selector {:#04x}",
            selector
        );
    }

    // An unrecognized selector consumes the argument but names no level.
    let mut cur = ByteCursor::new(&[0xE1, 0x83]);
    assert_eq!(
        opcode::decode(&mut cur),
        Opcode::Update {
            level: None,
            delta: Delta::Binary(1)
        }
    );
    assert!(cur.is_empty());
}

#[test]
fn special_opcodes() {
    let mut cur = ByteCursor::new(&[0xF0]);
    assert_eq!(opcode::decode(&mut cur), Opcode::EndBlock);

    let mut cur = ByteCursor::new(&[0xFE]);
    assert_eq!(opcode::decode(&mut cur), Opcode::EndWork);

    let mut cur = ByteCursor::new(&[0xF5]);
    assert_eq!(opcode::decode(&mut cur), Opcode::Nop);
}

#[test]
fn argument_shapes() {
    let cases: [(&[u8], Delta); 10] = [
        (&[0x80], Delta::Increment),
        (&[0x83], Delta::Binary(3)),
        (&[0x88, 0x85], Delta::Binary(5)),
        (&[0x89, 0x85, 0xE1], Delta::BinaryAscii(5, "a".into())),
        (&[0x8A, 0x85, 0xE1, 0xE2, 0xFF], Delta::BinaryAscii(5, "ab".into())),
        (&[0x8B, 0x82, 0xC7], Delta::Binary(327)),
        (&[0x8C, 0x82, 0xC7, 0xE1], Delta::BinaryAscii(327, "a".into())),
        (&[0x8D, 0x82, 0xC7, 0xE1, 0xFF], Delta::BinaryAscii(327, "a".into())),
        (&[0x8E, 0xE1], Delta::Ascii("a".into())),
        (&[0x8F, 0xE1, 0xFF], Delta::Ascii("a".into())),
    ];
    for (bytes, expected) in cases {
        let mut cur = ByteCursor::new(bytes);
        let decoded = opcode::decode(&mut cur);
        assert_eq!(
            decoded,
            Opcode::Update {
                level: Some(Level::Z),
                delta: expected
            },
            "bytes {:02x?}",
            bytes
        );
        assert!(cur.is_empty(), "bytes {:02x?} left arguments behind", bytes);
    }
}

#[test]
fn work_level_update_resets_subordinates_to_null() {
    let mut state = CitationState::new();
    state.apply(Level::W, &Delta::Binary(3), &[]);
    state.apply(Level::X, &Delta::Binary(7), &[]);

    // Escape-encoded "b := 5".
    let mut cur = ByteCursor::new(&[0xE8, 0x81, 0x85]);
    let Opcode::Update {
        level: Some(level),
        delta,
    } = opcode::decode(&mut cur)
    else {
        panic!("expected a level update");
    };
    assert_eq!(level, Level::B);
    assert_eq!(delta, Delta::Binary(5));

    state.apply(level, &delta, &[]);

    let b = state.level(Level::B);
    assert_eq!((b.binary, b.ascii.as_str(), b.active), (5, "", true));
    for higher in [
        Level::C,
        Level::D,
        Level::N,
        Level::V,
        Level::W,
        Level::X,
        Level::Y,
        Level::Z,
    ] {
        let st = state.level(higher);
        assert_eq!(
            (st.binary, st.ascii.as_str(), st.active),
            (0, "", false),
            "level {} not wiped",
            higher
        );
    }
}

#[test]
fn increment_touches_one_level_only() {
    let mut state = CitationState::new();
    state.apply(Level::Z, &Delta::Increment, &[]);
    assert_eq!(state.level(Level::Z).binary, 1);
    assert!(state.level(Level::Z).active);
    for lower in [Level::A, Level::B, Level::W, Level::Y] {
        assert!(!state.level(lower).active);
    }

    state.apply(Level::Z, &Delta::Increment, &[]);
    assert_eq!(state.level(Level::Z).binary, 2);
}

#[test]
fn textual_update_restarts_subordinates_at_line_one() {
    let mut state = CitationState::new();
    state.apply(Level::X, &Delta::Binary(9), &[]);
    state.apply(Level::W, &Delta::Binary(2), &[]);
    for higher in [Level::X, Level::Y, Level::Z] {
        let st = state.level(higher);
        assert_eq!(
            (st.binary, st.ascii.as_str(), st.active),
            (1, "", true),
            "level {} should restart at 1",
            higher
        );
    }
}

#[test]
fn two_rank_page_column_revert() {
    let schema = [Level::W, Level::X];
    let mut state = CitationState::new();
    state.apply(Level::W, &Delta::BinaryAscii(24, "a".into()), &schema);
    state.apply(Level::W, &Delta::Increment, &schema);

    let w = state.level(Level::W);
    assert_eq!((w.binary, w.ascii.as_str()), (24, "b"));
}

#[test]
fn revert_requires_the_primary_level() {
    let schema = [Level::W, Level::X];
    let mut state = CitationState::new();
    state.apply(Level::X, &Delta::BinaryAscii(24, "a".into()), &schema);
    state.apply(Level::X, &Delta::Increment, &schema);

    // Not the lower-rank level of the pair: a plain advance.
    let x = state.level(Level::X);
    assert_eq!((x.binary, x.ascii.as_str()), (25, ""));
}

#[test]
fn reset_is_idempotent() {
    let mut once = CitationState::new();
    once.apply(Level::W, &Delta::BinaryAscii(7, "b".into()), &[]);
    let mut twice = once.clone();

    once.reset();
    twice.reset();
    twice.reset();
    assert_eq!(once, twice);
    assert_eq!(once, CitationState::new());
}

#[test]
fn legacy_ascii_work_id_group() {
    let id = work_id::decode(&WorkId::default(), &[0xEF, 0x81, 0xB1, 0xB2, 0xB3, 0xFF]);
    assert_eq!(id.to_id_string(), "123");
    assert_eq!(id.int_part, 123);
}

#[test]
fn legacy_ascii_keeps_alphanumerics_only() {
    // 0xAE is '.', which the legacy decoder drops.
    let id = work_id::decode(&WorkId::default(), &[0xEF, 0x81, 0xC1, 0xAE, 0xE2, 0xFF]);
    assert_eq!(id.to_id_string(), "Ab");
    assert_eq!(id.int_part, 0);
}

#[test]
fn only_work_opcodes_update_the_id() {
    let prev = WorkId {
        int_part: 3,
        suffix: String::new(),
    };

    // A z-level opcode consumes its argument but changes nothing.
    let id = work_id::decode(&prev, &[0x88, 0x85]);
    assert_eq!(id, prev);

    // The same argument behind the work-level escape applies.
    let id = work_id::decode(&prev, &[0xE8, 0x81, 0x85]);
    assert_eq!(id.to_id_string(), "5");
}

#[test]
fn work_id_suffix_delta() {
    let prev = WorkId {
        int_part: 2,
        suffix: String::new(),
    };
    let id = work_id::decode(&prev, &[0xEE, 0x81, 0xE1]);
    assert_eq!(id.to_id_string(), "2a");
}

#[test]
fn work_id_decoder_is_deterministic() {
    let prev = WorkId {
        int_part: 11,
        suffix: "b".into(),
    };
    let bytes = [0xE8, 0x81, 0x8C, 0xEE, 0x81, 0xE4];
    assert_eq!(work_id::decode(&prev, &bytes), work_id::decode(&prev, &bytes));
}

#[test]
fn numeric_ids_normalize() {
    assert_eq!(normalize_id("001"), "1");
    assert_eq!(normalize_id("010"), "10");
    assert_eq!(normalize_id("2a"), "2a");
    assert_eq!(normalize_id("1"), "1");
}

#[test]
fn beta_code_letters_render_as_greek() {
    assert_eq!(BetaCode::to_greek("abg"), "αβγ");
    assert_eq!(BetaCode::to_greek("*a"), "Α");
    assert_eq!(BetaCode::to_greek("lo/gos"), "λο\u{0301}γος");
    assert!(BetaCode::to_greek("logos").ends_with('ς'));
}

#[test]
fn capital_diacritics_precede_the_letter() {
    assert_eq!(BetaCode::to_greek("*)en"), "Ε\u{0313}ν");
}

#[test]
fn latin_text_passes_through() {
    assert_eq!(BetaCode::to_latin("Cicero"), "Cicero");
    assert_eq!(BetaCode::to_latin("&7Marcus& Tullius"), "Marcus Tullius");
}

#[test]
fn render_detects_greek_by_escape() {
    assert_eq!(BetaCode::render("*ilias"), "Ιλιας");
    assert_eq!(BetaCode::render("Opera"), "Opera");
}
