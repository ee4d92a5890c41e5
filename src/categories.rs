/// Category catalogue of the question bank, as `(id, name)` pairs
pub const CATEGORIES: &[(&str, &str)] = &[
    ("9", "General Knowledge"),
    ("10", "Entertainment: Books"),
    ("11", "Entertainment: Film"),
    ("12", "Entertainment: Music"),
    ("13", "Entertainment: Musicals & Theatres"),
    ("14", "Entertainment: Television"),
    ("15", "Entertainment: Video Games"),
    ("16", "Entertainment: Board Games"),
    ("17", "Science & Nature"),
    ("18", "Science: Computers"),
    ("19", "Science: Mathematics"),
    ("20", "Mythology"),
    ("21", "Sports"),
    ("22", "Geography"),
    ("23", "History"),
    ("24", "Politics"),
    ("25", "Art"),
    ("26", "Celebrities"),
    ("27", "Animals"),
    ("28", "Vehicles"),
    ("29", "Entertainment: Comics"),
    ("30", "Science: Gadgets"),
    ("31", "Entertainment: Japanese Anime & Manga"),
    ("32", "Entertainment: Cartoon & Animations"),
];

/// Display name for a category id; `None` means any category
pub fn category_name(id: Option<&str>) -> &'static str {
    match id {
        None => "Any Category",
        Some(id) => CATEGORIES
            .iter()
            .find(|(cid, _)| *cid == id)
            .map(|(_, name)| *name)
            .unwrap_or("Custom Category"),
    }
}

/// Position in the setup list, where 0 is "any" and `i + 1` is `CATEGORIES[i]`
pub fn category_position(id: Option<&str>) -> usize {
    id.and_then(|id| CATEGORIES.iter().position(|(cid, _)| *cid == id))
        .map(|p| p + 1)
        .unwrap_or(0)
}

pub fn category_at(position: usize) -> Option<&'static str> {
    position
        .checked_sub(1)
        .and_then(|i| CATEGORIES.get(i))
        .map(|(id, _)| *id)
}
