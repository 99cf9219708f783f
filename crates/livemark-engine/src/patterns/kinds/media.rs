use crate::models::{EntityType, Mutability};

/// A `[text](target "title")` construct: a hyperlink, or one of the media
/// kinds written with a leading `!`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Hyperlink,
}

const IMAGE_EXTENSIONS: &[&str] = &[
    "bmp", "jpg", "jpeg", "png", "gif", "tif", "tiff", "dib", "psd", "raw", "pxr", "mac", "tga",
    "vst", "pcd", "pct", "ai", "fpx", "cal", "img", "wi", "eps", "ico", "cr2", "crw", "cur", "ani",
];

const VIDEO_EXTENSIONS: &[&str] = &[
    "asf", "avi", "wm", "wmp", "wmv", "rm", "rmvb", "rp", "rpm", "rt", "smi", "smil", "m1v", "m2p",
    "m2t", "m2ts", "m2v", "mp2v", "mpe", "mpeg", "mpg", "mpv2", "pss", "pva", "tp", "tpr", "ts",
    "m4b", "m4p", "m4v", "mp4", "mpeg4", "3g2", "3gp", "3gp2", "3gpp", "mov", "qt", "f4v", "flv",
    "hlv", "swf", "ifo", "vob", "amv", "bik", "csf", "divx", "evo", "ivm", "mkv", "mod", "mts",
    "ogm", "pmp", "scm", "tod", "vp6", "webm", "xlmv", "asx", "cue", "m3u", "pls", "qpl",
];

const AUDIO_EXTENSIONS: &[&str] = &[
    "aac", "ac3", "amr", "ape", "cda", "dts", "flac", "m1a", "m2a", "m4a", "mid", "midi", "mka",
    "mp2", "mp3", "mpa", "ogg", "ra", "tak", "tta", "wav", "wma", "wv", "ram", "kpl", "smpl",
];

impl MediaKind {
    /// Marks a media construct: `![alt](src)`.
    pub const MARKER: char = '!';
    pub const TEXT_OPEN: char = '[';
    pub const TEXT_CLOSE: char = ']';
    pub const TARGET_OPEN: char = '(';
    pub const TARGET_CLOSE: char = ')';
    pub const TITLE_QUOTE: char = '"';

    /// Matching order: media kinds before the hyperlink they contain.
    pub const RULE_ORDER: [MediaKind; 4] = [
        MediaKind::Image,
        MediaKind::Video,
        MediaKind::Audio,
        MediaKind::Hyperlink,
    ];

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            MediaKind::Image => IMAGE_EXTENSIONS,
            MediaKind::Video => VIDEO_EXTENSIONS,
            MediaKind::Audio => AUDIO_EXTENSIONS,
            MediaKind::Hyperlink => &[],
        }
    }

    pub fn entity_type(self) -> EntityType {
        match self {
            MediaKind::Image => EntityType::Image,
            MediaKind::Video => EntityType::Video,
            MediaKind::Audio => EntityType::Audio,
            MediaKind::Hyperlink => EntityType::Hyperlink,
        }
    }

    /// Links stay editable text; media become a single immutable placeholder.
    pub fn mutability(self) -> Mutability {
        match self {
            MediaKind::Hyperlink => Mutability::Mutable,
            _ => Mutability::Immutable,
        }
    }

    pub fn from_entity_type(entity_type: EntityType) -> Self {
        match entity_type {
            EntityType::Image => MediaKind::Image,
            EntityType::Video => MediaKind::Video,
            EntityType::Audio => MediaKind::Audio,
            EntityType::Hyperlink => MediaKind::Hyperlink,
        }
    }

    /// Regex with named groups `text`, `target` and optional `title`.
    ///
    /// Targets may hold spaces and the title's leading space is optional.
    /// Media targets must end in one of the kind's extensions (any case),
    /// optionally followed by a query or fragment.
    pub fn pattern(self) -> String {
        const TEXT: &str = r"\[(?P<text>[^\]]*)\]";
        const TITLE: &str = r#"(?:\s*"(?P<title>[^"]*)")?\)"#;
        match self {
            MediaKind::Hyperlink => format!(r"{TEXT}\((?P<target>[^)]+?){TITLE}"),
            kind => format!(
                r"{}{TEXT}\((?P<target>[^)]+?\.(?i:{})(?:[?#][^)]*?)?){TITLE}",
                regex::escape(&Self::MARKER.to_string()),
                kind.extensions().join("|"),
            ),
        }
    }

    /// Raw syntax for a construct, the inverse of [`MediaKind::pattern`].
    pub fn render(self, text: &str, target: &str, title: Option<&str>) -> String {
        let mut out = String::new();
        if self != MediaKind::Hyperlink {
            out.push(Self::MARKER);
        }
        out.push(Self::TEXT_OPEN);
        out.push_str(text);
        out.push(Self::TEXT_CLOSE);
        out.push(Self::TARGET_OPEN);
        out.push_str(target);
        if let Some(title) = title {
            out.push(' ');
            out.push(Self::TITLE_QUOTE);
            out.push_str(title);
            out.push(Self::TITLE_QUOTE);
        }
        out.push(Self::TARGET_CLOSE);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(MediaKind::Hyperlink, "site", "http://x.com", None, "[site](http://x.com)")]
    #[case(MediaKind::Hyperlink, "site", "http://x.com", Some("X"), r#"[site](http://x.com "X")"#)]
    #[case(MediaKind::Image, "cat", "cat.png", None, "![cat](cat.png)")]
    fn renders_raw_syntax(
        #[case] kind: MediaKind,
        #[case] text: &str,
        #[case] target: &str,
        #[case] title: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(kind.render(text, target, title), expected);
    }

    #[test]
    fn only_media_kinds_have_extensions() {
        for kind in [MediaKind::Image, MediaKind::Video, MediaKind::Audio] {
            assert!(!kind.extensions().is_empty());
        }
        assert!(MediaKind::Hyperlink.extensions().is_empty());
    }
}
