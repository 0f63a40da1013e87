// Company-name reconciliation. Free-text company names arrive in many
// spellings (URL-encoded, hyphenated, Turkish vs ASCII letters, corporate
// suffixes, loan-word synonyms); this module decides when two spellings
// mean the same company and derives the canonical display form for a slug.

use std::collections::BTreeSet;

/// Slugs with a fixed display form. Keys are normalized lookup keys
/// (lowercased, separators collapsed to `-`); Turkish and ASCII spellings
/// both appear where users type both.
const KNOWN_COMPANIES: &[(&str, &str)] = &[
    ("a101", "A101"),
    ("aycra", "Aycra"),
    ("aycra-ajans", "Aycra Ajans"),
    ("beymen", "Beymen"),
    ("bim", "BİM"),
    ("boyner", "Boyner"),
    ("burger-king", "Burger King"),
    ("carrefour", "CarrefourSA"),
    ("carrefoursa", "CarrefourSA"),
    ("defacto", "DeFacto"),
    ("getir", "Getir"),
    ("gittigidiyor", "GittiGidiyor"),
    ("hepsiburada", "Hepsiburada"),
    ("ikea", "IKEA"),
    ("koton", "Koton"),
    ("lc-waikiki", "LC Waikiki"),
    ("lcw", "LC Waikiki"),
    ("mango", "Mango"),
    ("media-markt", "Media Markt"),
    ("mediamarkt", "Media Markt"),
    ("migros", "Migros"),
    ("n11", "N11"),
    ("sok", "ŞOK"),
    ("şok", "ŞOK"),
    ("teknosa", "Teknosa"),
    ("trendyol", "Trendyol"),
    ("turk-telekom", "Türk Telekom"),
    ("türk-telekom", "Türk Telekom"),
    ("turkcell", "Turkcell"),
    ("vatan", "Vatan Bilgisayar"),
    ("vodafone", "Vodafone"),
    ("yemeksepeti", "Yemeksepeti"),
    ("zara", "Zara"),
];

/// Short blurbs for a handful of well-known companies; everything else
/// falls back to a generic line.
const COMPANY_DESCRIPTIONS: &[(&str, &str)] = &[
    ("turkcell", "Türkiye'nin en büyük GSM operatörü"),
    ("vodafone", "Küresel telekomünikasyon şirketi"),
    ("zara", "İspanyol kökenli moda markası"),
    ("migros", "Türkiye'nin önde gelen market zinciri"),
    ("lc-waikiki", "Uygun fiyatlı giyim ve ev tekstili markası"),
    ("lcw", "Uygun fiyatlı giyim ve ev tekstili markası"),
];

/// Corporate suffix tokens dropped when they trail a longer name.
const SUFFIX_TOKENS: &[&str] = &[
    "a.ş", "aş", "ltd", "şti", "sti", "holding", "grup", "group", "ajans", "inc", "co",
];

/// Loan-word pairs treated as interchangeable, in both directions.
const SYNONYMS: &[(&str, &str)] = &[("bank", "banka"), ("hotel", "otel"), ("taksi", "taxi")];

/// Company slugs enumerated in the sitemap.
pub const SITEMAP_COMPANY_SLUGS: &[&str] = &[
    "turkcell",
    "vodafone",
    "zara",
    "migros",
    "getir",
    "teknosa",
    "hm",
    "carrefoursa",
    "yemeksepeti",
    "turk-telekom",
    "mango",
    "lcw",
    "lc-waikiki",
    "defacto",
    "koton",
    "trendyol",
    "hepsiburada",
    "n11",
    "gittigidiyor",
    "amazon",
    "netflix",
    "spotify",
    "uber",
    "yandex",
    "bim",
    "a101",
    "sok",
    "carrefour",
    "real",
    "macro",
    "bauhaus",
    "koctas",
    "ikea",
    "mediamarkt",
    "vatan",
    "gold",
    "boyner",
    "vakko",
    "beymen",
    "nike",
    "adidas",
    "puma",
    "mcdonalds",
    "burger-king",
    "kfc",
    "dominos",
    "pizza-hut",
    "starbucks",
    "gloria-jeans",
    "tchibo",
];

/// URL-safe slug for a free-text company name: lowercase, runs of
/// whitespace become a single hyphen.
pub fn slug(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Display name for a URL slug. Known slugs resolve through the static
/// table; everything else is percent-decoded and title-cased, with short
/// all-caps words (BIM, KFC) left alone. Degenerate input becomes "Firma".
pub fn display_name(slug: &str) -> String {
    if let Some(name) = known_company(slug) {
        return name.to_string();
    }

    let formatted = title_case(&spaced(&decode(slug)));
    if formatted.chars().count() < 2 {
        "Firma".to_string()
    } else {
        formatted
    }
}

/// Description blurb for a slug, falling back to a generic line built
/// from the display name.
pub fn description(slug: &str) -> String {
    let key = lookup_key(slug);
    COMPANY_DESCRIPTIONS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, d)| d.to_string())
        .unwrap_or_else(|| format!("{} hakkında şikayetler", display_name(slug)))
}

/// Canonical display form for a name, if the name resolves through the
/// known-company table.
pub fn known_company(name: &str) -> Option<&'static str> {
    let key = lookup_key(name);
    KNOWN_COMPANIES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
}

/// True when two free-text company names refer to the same company.
pub fn same_company(a: &str, b: &str) -> bool {
    sets_match(&variants(a), &variants(b))
}

/// Precomputed variant set for matching many names against one target.
pub struct Matcher {
    variants: BTreeSet<String>,
}

impl Matcher {
    pub fn new(name: &str) -> Self {
        Self {
            variants: variants(name),
        }
    }

    pub fn matches(&self, other: &str) -> bool {
        sets_match(&self.variants, &variants(other))
    }
}

/// All spelling variants a name is considered equal to: case-folded,
/// percent-decoded, separator-normalized, Turkish letters folded to ASCII,
/// apostrophes/dots dropped, trailing corporate suffixes stripped, loan-word
/// synonyms swapped, a de-pluralized form, and the slug form of each.
pub fn variants(name: &str) -> BTreeSet<String> {
    let mut set = BTreeSet::new();
    let lower = name.trim().to_lowercase();
    if lower.is_empty() {
        return set;
    }

    expand(&mut set, spaced(&lower));
    expand(&mut set, spaced(&decode(&lower)));
    if let Some(canonical) = known_company(name) {
        // Aliases like "lcw" pick up the canonical spelling so short
        // aliases group by exact intersection rather than substring.
        expand(&mut set, spaced(&canonical.to_lowercase()));
    }

    // Corporate suffixes can stack ("x ltd şti"); keep stripping while
    // new forms appear.
    let mut changed = true;
    while changed {
        changed = false;
        for v in set.clone() {
            if let Some(stripped) = strip_suffix_token(&v) {
                let before = set.len();
                expand(&mut set, stripped);
                changed |= set.len() > before;
            }
        }
    }

    for v in set.clone() {
        for swapped in synonym_swaps(&v) {
            expand(&mut set, swapped);
        }
    }

    for v in set.clone() {
        if v.ends_with('s') && v.chars().count() > 3 {
            expand(&mut set, v[..v.len() - 1].to_string());
        }
    }

    for v in set.clone() {
        set.insert(v.replace(' ', "-"));
    }

    set
}

/// Group a list of company spellings into reconciled (name, count) buckets.
/// The first spelling seen names its group, upgraded to the known-company
/// canonical form when one of the members resolves through the table.
/// Returned buckets are sorted by count, largest first.
pub fn group_by_company(names: &[String]) -> Vec<(String, i64)> {
    let mut groups: Vec<(String, bool, BTreeSet<String>, i64)> = Vec::new();

    for name in names {
        let name_variants = variants(name);
        let canonical = known_company(name);

        match groups
            .iter_mut()
            .find(|(_, _, group_variants, _)| sets_match(group_variants, &name_variants))
        {
            Some((display, is_canonical, group_variants, count)) => {
                *count += 1;
                group_variants.extend(name_variants);
                if !*is_canonical {
                    if let Some(c) = canonical {
                        *display = c.to_string();
                        *is_canonical = true;
                    }
                }
            }
            None => {
                let display = canonical.map(str::to_string).unwrap_or_else(|| name.clone());
                groups.push((display, canonical.is_some(), name_variants, 1));
            }
        }
    }

    let mut out: Vec<(String, i64)> = groups
        .into_iter()
        .map(|(display, _, _, count)| (display, count))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

fn sets_match(a: &BTreeSet<String>, b: &BTreeSet<String>) -> bool {
    if a.intersection(b).next().is_some() {
        return true;
    }
    // Substring containment, but the contained variant must be at least
    // four characters: "a" must not swallow "a101" or "bim a101".
    a.iter().any(|x| {
        b.iter()
            .any(|y| contains_guarded(x, y) || contains_guarded(y, x))
    })
}

fn contains_guarded(needle: &str, hay: &str) -> bool {
    needle.chars().count() >= 4 && hay.contains(needle)
}

/// Insert a variant together with its Turkish-folded and
/// punctuation-stripped forms.
fn expand(set: &mut BTreeSet<String>, v: String) {
    if v.is_empty() {
        return;
    }
    let folded = fold_turkish(&v);
    let unpunct = strip_punct(&v);
    let folded_unpunct = strip_punct(&folded);
    for s in [v, folded, unpunct, folded_unpunct] {
        if !s.is_empty() {
            set.insert(s);
        }
    }
}

/// Percent-decode a spelling that arrived through a URL. Malformed
/// escapes pass through untouched.
fn decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let h1 = bytes[i + 1] as char;
            let h2 = bytes[i + 2] as char;
            if let (Some(a), Some(b)) = (h1.to_digit(16), h2.to_digit(16)) {
                out.push(((a << 4) + b) as u8);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).to_string()
}

/// Separators (`-`, `_`, `+`) become spaces; runs of whitespace collapse.
fn spaced(s: &str) -> String {
    s.chars()
        .map(|c| if matches!(c, '-' | '_' | '+') { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn fold_turkish(s: &str) -> String {
    s.chars()
        .filter_map(|c| match c {
            'ç' => Some('c'),
            'ğ' => Some('g'),
            'ı' => Some('i'),
            'ö' => Some('o'),
            'ş' => Some('s'),
            'ü' => Some('u'),
            // Combining dot left behind by lowercasing 'İ'.
            '\u{0307}' => None,
            _ => Some(c),
        })
        .collect()
}

fn strip_punct(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '\'' | '’' | '.'))
        .collect()
}

fn strip_suffix_token(v: &str) -> Option<String> {
    let mut tokens: Vec<&str> = v.split(' ').collect();
    if tokens.len() < 2 {
        return None;
    }
    let last = tokens.last()?;
    if SUFFIX_TOKENS.contains(last) {
        tokens.pop();
        Some(tokens.join(" "))
    } else {
        None
    }
}

fn synonym_swaps(v: &str) -> Vec<String> {
    let mut out = Vec::new();
    for (a, b) in SYNONYMS {
        for (from, to) in [(a, b), (b, a)] {
            if v.split(' ').any(|t| t == *from) {
                out.push(
                    v.split(' ')
                        .map(|t| if t == *from { *to } else { t })
                        .collect::<Vec<_>>()
                        .join(" "),
                );
            }
        }
    }
    out
}

fn lookup_key(name: &str) -> String {
    let lower = decode(name).trim().to_lowercase();
    let mut key = String::new();
    for c in lower.chars() {
        if matches!(c, '-' | '_' | '+') || c.is_whitespace() {
            if !key.ends_with('-') && !key.is_empty() {
                key.push('-');
            }
        } else {
            key.push(c);
        }
    }
    while key.ends_with('-') {
        key.pop();
    }
    key
}

/// Title-case words, leaving short all-caps words (BIM, KFC, N11) as-is.
fn title_case(words: &str) -> String {
    words
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(|w| {
            if w.chars().count() <= 3 && w.to_uppercase() == w {
                w.to_string()
            } else {
                let mut chars = w.chars();
                match chars.next() {
                    Some(first) => {
                        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                    }
                    None => String::new(),
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
