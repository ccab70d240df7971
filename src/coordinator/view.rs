use url::Url;

use crate::style::StyleSelection;

/// Flat UI surface written by the coordinator. `true` in a `*_hidden` field means hidden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub preview_placeholder_hidden: bool,
    pub active_style: StyleSelection,

    pub upload_frame_hidden: bool,
    pub camera_container_hidden: bool,
    pub start_camera_hidden: bool,
    pub stop_camera_hidden: bool,

    pub scan_placeholder_hidden: bool,
    pub scan_content_hidden: bool,
    pub result_text: String,
    /// Link target, shown only when set.
    pub result_link: Option<String>,
}

impl Default for PageView {
    fn default() -> Self {
        Self {
            preview_placeholder_hidden: false,
            active_style: StyleSelection::default(),
            upload_frame_hidden: false,
            camera_container_hidden: true,
            start_camera_hidden: false,
            stop_camera_hidden: true,
            scan_placeholder_hidden: false,
            scan_content_hidden: true,
            result_text: String::new(),
            result_link: None,
        }
    }
}

impl PageView {
    pub fn style_buttons(&self) -> [(StyleSelection, bool); 4] {
        StyleSelection::ALL.map(|s| (s, s == self.active_style))
    }

    pub fn is_camera_mode(&self) -> bool {
        self.upload_frame_hidden
            && !self.camera_container_hidden
            && self.start_camera_hidden
            && !self.stop_camera_hidden
    }

    pub(crate) fn enter_camera_mode(&mut self) {
        self.upload_frame_hidden = true;
        self.camera_container_hidden = false;
        self.start_camera_hidden = true;
        self.stop_camera_hidden = false;
    }

    pub(crate) fn reset_scanner(&mut self) {
        self.upload_frame_hidden = false;
        self.camera_container_hidden = true;
        self.start_camera_hidden = false;
        self.stop_camera_hidden = true;
    }

    pub(crate) fn show_result(&mut self, text: &str) {
        self.scan_placeholder_hidden = true;
        self.scan_content_hidden = false;
        self.result_text = text.to_string();
        self.result_link = is_http_url(text).then(|| text.to_string());
    }
}

/// True when `s` parses as an absolute URL with the `http` or `https` scheme.
pub fn is_http_url(s: &str) -> bool {
    Url::parse(s).map(|url| matches!(url.scheme(), "http" | "https")).unwrap_or(false)
}

#[cfg(test)]
mod view_tests {
    use proptest::prelude::*;
    use test_case::test_case;

    use super::{is_http_url, PageView};
    use crate::style::StyleSelection;

    #[test_case("https://example.com", true; "https")]
    #[test_case("http://a.b/c?d=e#f", true; "http with query")]
    #[test_case("HTTPS://EXAMPLE.COM", true; "upper case scheme")]
    #[test_case("ftp://example.com", false; "ftp")]
    #[test_case("mailto:someone@example.com", false; "mailto")]
    #[test_case("not a url", false; "plain text")]
    #[test_case("example.com", false; "no scheme")]
    #[test_case("", false; "empty")]
    fn test_is_http_url(s: &str, exp: bool) {
        assert_eq!(is_http_url(s), exp);
    }

    proptest! {
        #[test]
        fn proptest_http_hosts(s in "https?://[a-z]{1,12}\\.(com|org|net)(/[a-z0-9]{0,8})?") {
            prop_assert!(is_http_url(&s));
        }

        #[test]
        fn proptest_plain_words(s in "[a-zA-Z ]{0,24}") {
            prop_assert!(!is_http_url(&s));
        }
    }

    #[test]
    fn test_default_view() {
        let view = PageView::default();
        assert!(!view.is_camera_mode());
        assert!(view.scan_content_hidden);
        assert!(!view.scan_placeholder_hidden);
        assert_eq!(view.result_link, None);
    }

    #[test]
    fn test_single_active_style() {
        let mut view = PageView::default();
        for style in StyleSelection::ALL {
            view.active_style = style;
            let active = view.style_buttons().iter().filter(|(_, on)| *on).count();
            assert_eq!(active, 1);
            assert!(view.style_buttons().contains(&(style, true)));
        }
    }

    #[test]
    fn test_camera_mode_toggle() {
        let mut view = PageView::default();
        view.enter_camera_mode();
        assert!(view.is_camera_mode());
        view.reset_scanner();
        assert_eq!(view, PageView::default());
    }

    #[test]
    fn test_show_result() {
        let mut view = PageView::default();
        view.show_result("https://example.com");
        assert!(view.scan_placeholder_hidden);
        assert!(!view.scan_content_hidden);
        assert_eq!(view.result_link.as_deref(), Some("https://example.com"));

        view.show_result("not a url");
        assert_eq!(view.result_text, "not a url");
        assert_eq!(view.result_link, None);
    }
}
