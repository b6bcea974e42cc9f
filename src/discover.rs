// Dataset base discovery
//
// The dataset is conventionally deployed next to the script that consumes it
// (`<base>/mac_vendor.js`). Hosts that know their script sources can derive the
// base from them instead of configuring it by hand.

use regex::Regex;
use std::sync::OnceLock;

static SCRIPT_SRC: OnceLock<Regex> = OnceLock::new();

fn script_src_pattern() -> &'static Regex {
    SCRIPT_SRC.get_or_init(|| {
        Regex::new(r"^(.*)/mac_vendor\.js(?:\?.*)?$").expect("script src pattern is valid")
    })
}

/// Extract the dataset base from a script source like `/static/mac_vendor.js?v=3`
///
/// Returns `Some("")` for a root-relative `/mac_vendor.js`; callers treat an
/// empty base as "keep looking".
pub fn base_from_script_src(src: &str) -> Option<String> {
    script_src_pattern()
        .captures(src)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// First non-empty base among candidate script sources, in order
///
/// Falls back to the empty base of a root-served `/mac_vendor.js`, which
/// resolves the dataset to `/oui.csv` and `/oui_cn.json`.
pub fn discover_base<'a, I>(sources: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut root = None;
    for base in sources.into_iter().filter_map(base_from_script_src) {
        if !base.is_empty() {
            return Some(base);
        }
        root.get_or_insert(base);
    }
    root
}
