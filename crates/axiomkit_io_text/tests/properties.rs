use axiomkit_io_text::{
    EnumTextGranularity, EnumTextTransform, SpecTextCopyOptions, copy_text, copy_text_stream,
};
use proptest::prelude::*;
use tempfile::TempDir;

fn run_stream(raw: &[u8], spec_options: SpecTextCopyOptions) -> (Vec<u8>, u64) {
    let mut buf_out = Vec::new();
    let report = copy_text_stream(raw, &mut buf_out, spec_options).expect("copy stream");
    (buf_out, report.cnt_units)
}

proptest! {
    #[test]
    fn byte_identity_round_trips(raw in proptest::collection::vec(any::<u8>(), 0..512)) {
        let spec_options = SpecTextCopyOptions {
            granularity: EnumTextGranularity::Byte,
            ..SpecTextCopyOptions::default()
        };
        let (buf_out, cnt_units) = run_stream(&raw, spec_options);
        prop_assert_eq!(&buf_out, &raw);
        prop_assert_eq!(cnt_units, raw.len() as u64);
    }

    #[test]
    fn character_identity_round_trips(txt in "\\PC{0,200}", n_capacity in 1_usize..16) {
        let spec_options = SpecTextCopyOptions {
            buffer_capacity: n_capacity,
            ..SpecTextCopyOptions::default()
        };
        let (buf_out, cnt_units) = run_stream(txt.as_bytes(), spec_options);
        prop_assert_eq!(String::from_utf8(buf_out).expect("utf8"), txt.clone());
        prop_assert_eq!(cnt_units, txt.chars().count() as u64);
    }

    #[test]
    fn uppercase_is_idempotent(txt in "[a-zA-Zß0-9 \\n.,!éü]{0,120}") {
        for granularity in [
            EnumTextGranularity::Byte,
            EnumTextGranularity::Character,
            EnumTextGranularity::Line,
        ] {
            let spec_options = SpecTextCopyOptions {
                granularity,
                transform: EnumTextTransform::Uppercase,
                ..SpecTextCopyOptions::default()
            };
            let (buf_once, _) = run_stream(txt.as_bytes(), spec_options.clone());
            let (buf_twice, _) = run_stream(&buf_once, spec_options);
            prop_assert_eq!(buf_once, buf_twice);
        }
    }

    #[test]
    fn line_count_matches_terminators(
        l_lines in proptest::collection::vec("[a-z ]{0,10}", 0..12),
        if_terminated in any::<bool>(),
    ) {
        let mut txt = l_lines.join("\n");
        if if_terminated && !l_lines.is_empty() {
            txt.push('\n');
        }
        let spec_options = SpecTextCopyOptions {
            granularity: EnumTextGranularity::Line,
            ..SpecTextCopyOptions::default()
        };
        let mut buf_out = Vec::new();
        let report = copy_text_stream(txt.as_bytes(), &mut buf_out, spec_options)
            .expect("copy stream");

        let n_terminators = txt.matches('\n').count() as u64;
        let n_tail = u64::from(!txt.is_empty() && !txt.ends_with('\n'));
        prop_assert_eq!(report.cnt_lines, n_terminators + n_tail);
        prop_assert_eq!(report.cnt_units, report.cnt_lines);
        prop_assert_eq!(report.cnt_chars, report.cnt_units);
        prop_assert_eq!(report.cnt_line_chars, txt.chars().filter(|ch| *ch != '\n').count() as u64);

        let txt_out = String::from_utf8(buf_out).expect("utf8");
        prop_assert_eq!(txt_out.matches('\n').count() as u64, report.cnt_lines);
    }
}

#[test]
fn file_round_trip_through_public_api() {
    let tmp = TempDir::new().expect("tempdir");
    let src = tmp.path().join("input.txt");
    let dst = tmp.path().join("output.txt");
    std::fs::write(&src, "Hello, Java I/O!\r\nline two\n").expect("write");

    let report = copy_text(&src, &dst, SpecTextCopyOptions::default()).expect("copy text");
    assert_eq!(
        std::fs::read(&dst).expect("read"),
        std::fs::read(&src).expect("read")
    );
    assert_eq!(report.cnt_lines, 2);
    assert_eq!(report.cnt_bytes_read, report.cnt_bytes_written);
}
