//! City name resolution
//!
//! Maps a spoken city name onto the fixed coordinate table used by the
//! weather lookup. Resolution runs three passes, first hit wins:
//!
//! 1. exact key match after lowercasing and trimming
//! 2. the alias table (see [`ALIASES`])
//! 3. gestalt string similarity against every key, cutoff [`SIMILARITY_CUTOFF`]
//!
//! Not finding a city is an ordinary outcome, so [`resolve`] returns an
//! `Option` rather than an error.

/// Minimum similarity ratio for a fuzzy match (inclusive)
pub const SIMILARITY_CUTOFF: f64 = 0.6;

/// Geographic position of a supported city
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Supported cities, keyed by lowercase canonical name
pub const CITIES: &[(&str, Coordinates)] = &[
    ("delhi", Coordinates::new(28.6139, 77.2090)),
    ("new delhi", Coordinates::new(28.6139, 77.2090)),
    ("lucknow", Coordinates::new(26.8467, 80.9462)),
    ("kanpur", Coordinates::new(26.4499, 80.3319)),
    ("agra", Coordinates::new(27.1767, 78.0081)),
    ("varanasi", Coordinates::new(25.3176, 82.9739)),
    ("prayagraj", Coordinates::new(25.4358, 81.8463)),
    ("ghaziabad", Coordinates::new(28.6692, 77.4538)),
    ("meerut", Coordinates::new(28.9845, 77.7064)),
    ("gorakhpur", Coordinates::new(26.7606, 83.3732)),
    ("aligarh", Coordinates::new(27.8974, 78.0880)),
    ("bareilly", Coordinates::new(28.3670, 79.4304)),
    ("moradabad", Coordinates::new(28.8388, 78.7768)),
    ("saharanpur", Coordinates::new(29.9640, 77.5461)),
    ("noida", Coordinates::new(28.5355, 77.3910)),
    ("greater noida", Coordinates::new(28.4744, 77.5040)),
    ("ayodhya", Coordinates::new(26.7924, 82.1948)),
    ("mathura", Coordinates::new(27.4924, 77.6737)),
    ("jhansi", Coordinates::new(25.4484, 78.5685)),
    ("shahjahanpur", Coordinates::new(27.8830, 79.9120)),
    ("firozabad", Coordinates::new(27.1591, 78.3958)),
    ("rampur", Coordinates::new(28.8103, 79.0268)),
    ("muzaffarnagar", Coordinates::new(29.4709, 77.7033)),
    ("shamli", Coordinates::new(29.4497, 77.3096)),
    ("hapur", Coordinates::new(28.7297, 77.7807)),
    ("amroha", Coordinates::new(28.9030, 78.4698)),
    ("etawah", Coordinates::new(26.7769, 79.0239)),
    ("mainpuri", Coordinates::new(27.2280, 79.0218)),
    ("sambhal", Coordinates::new(28.5841, 78.5699)),
    ("azamgarh", Coordinates::new(26.0674, 83.1836)),
    ("ballia", Coordinates::new(25.7615, 84.1471)),
    ("deoria", Coordinates::new(26.5047, 83.7873)),
    ("basti", Coordinates::new(27.1167, 82.7167)),
    ("sultanpur", Coordinates::new(26.2649, 82.0727)),
    ("lakhimpur", Coordinates::new(27.9483, 80.7795)),
    ("sitapur", Coordinates::new(27.5619, 80.6826)),
    ("hardoi", Coordinates::new(27.0943, 80.1311)),
    ("unnao", Coordinates::new(26.5471, 80.4878)),
    ("raebareli", Coordinates::new(26.2309, 81.2332)),
    ("fatehpur", Coordinates::new(25.9304, 80.8139)),
    ("pratapgarh", Coordinates::new(25.8969, 81.9436)),
    ("jaunpur", Coordinates::new(25.7539, 82.6868)),
    ("mirzapur", Coordinates::new(25.1449, 82.5653)),
    ("sonbhadra", Coordinates::new(24.4021, 83.0539)),
    ("chitrakoot", Coordinates::new(25.1605, 80.8906)),
    ("banda", Coordinates::new(25.4776, 80.3349)),
    ("hamirpur", Coordinates::new(25.9500, 80.1500)),
    ("mahoba", Coordinates::new(25.2833, 79.8667)),
    ("lalitpur", Coordinates::new(24.6877, 78.4127)),
    ("jalaun", Coordinates::new(26.1480, 79.3365)),
    ("orai", Coordinates::new(26.0114, 79.4533)),
    ("etah", Coordinates::new(27.6333, 78.6667)),
    ("kasganj", Coordinates::new(27.8167, 78.6500)),
    ("farrukhabad", Coordinates::new(27.3917, 79.5800)),
];

/// Alternate spellings, checked in order.
///
/// An entry matches when the input is one of its aliases, or when the
/// canonical name appears anywhere inside the input. The second check is
/// loose: "noida sector 62" resolves to "noida", but so does
/// "greater noida west".
pub const ALIASES: &[(&str, &[&str])] = &[
    ("new delhi", &["delhi", "noida"]),
    ("delhi", &["new delhi", "noida"]),
    ("noida", &["greater noida"]),
    ("greater noida", &["noida"]),
    ("prayagraj", &["allahabad"]),
    ("allahabad", &["prayagraj"]),
];

/// Look up the coordinates for a canonical city key
#[must_use]
pub fn coordinates(city: &str) -> Option<Coordinates> {
    CITIES
        .iter()
        .find(|(name, _)| *name == city)
        .map(|(_, coords)| *coords)
}

/// Resolve free-text input to a canonical city key
///
/// The returned key normally indexes [`CITIES`]; an alias entry may name a
/// canonical that has no coordinates (`allahabad`), which callers treat the
/// same as no match.
#[must_use]
pub fn resolve(input: &str) -> Option<&'static str> {
    let city = input.trim().to_lowercase();

    if let Some((name, _)) = CITIES.iter().find(|(name, _)| *name == city) {
        return Some(*name);
    }

    for (canonical, aliases) in ALIASES {
        if aliases.contains(&city.as_str()) || city.contains(*canonical) {
            tracing::debug!(input = %city, canonical = *canonical, "city resolved via alias");
            return Some(*canonical);
        }
    }

    let best = closest_match(&city, CITIES.iter().map(|(name, _)| *name), SIMILARITY_CUTOFF);
    match best {
        Some(name) => tracing::debug!(input = %city, matched = name, "city resolved by similarity"),
        None => tracing::debug!(input = %city, "no city match"),
    }
    best
}

/// Pick the candidate most similar to `word`, if any reaches `cutoff`
///
/// Each candidate is scored as `similarity(candidate, word)`; the measure is
/// not symmetric, so the order matters. Equal scores resolve toward the
/// lexicographically greater candidate.
#[must_use]
pub fn closest_match<'a>(
    word: &str,
    candidates: impl IntoIterator<Item = &'a str>,
    cutoff: f64,
) -> Option<&'a str> {
    candidates
        .into_iter()
        .map(|candidate| (similarity(candidate, word), candidate))
        .filter(|(score, _)| *score >= cutoff)
        .max_by(|(sa, a), (sb, b)| sa.total_cmp(sb).then_with(|| a.cmp(b)))
        .map(|(_, candidate)| candidate)
}

/// Gestalt (Ratcliff/Obershelp) similarity in `[0.0, 1.0]`
///
/// `2 * M / T`, where `M` counts characters in the matching blocks found by
/// repeatedly taking the longest common substring and recursing on both
/// sides of it, and `T` is the combined length.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }

    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`
///
/// Returns `(i, j, size)`; among equally long blocks the one starting
/// earliest in `a`, then earliest in `b`, wins.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    // run[j + 1] = length of the common run ending at a[i - 1], b[j]
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            cur[j + 1] = if a[i] == b[j] { prev[j] + 1 } else { 0 };
            let k = cur[j + 1];
            if k > best_size {
                best_i = i + 1 - k;
                best_j = j + 1 - k;
                best_size = k;
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    (best_i, best_j, best_size)
}
