//! Case conversion for description names.
//!
//! Description names are written in `snake_case` or `camelCase`; emitted
//! type names are `PascalCase` and members `camelCase`.

/// Converts `movie_genre` or `movieGenre` to `MovieGenre`.
#[must_use]
pub fn pascal_case(name: &str) -> String {
    name.split(['_', '-', ' '])
        .filter(|segment| !segment.is_empty())
        .map(capitalize)
        .collect()
}

/// Converts `movie_genre` or `MovieGenre` to `movieGenre`.
#[must_use]
pub fn camel_case(name: &str) -> String {
    let pascal = pascal_case(name);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Converts `movieGenre` or `MovieGenre` to `movie_genre`.
#[must_use]
pub fn snake_case(name: &str) -> String {
    let mut snake = String::with_capacity(name.len() + 4);
    let mut previous_lower = false;
    for c in name.chars() {
        if c == '-' || c == ' ' {
            snake.push('_');
            previous_lower = false;
        } else if c.is_uppercase() {
            if previous_lower {
                snake.push('_');
            }
            snake.extend(c.to_lowercase());
            previous_lower = false;
        } else {
            snake.push(c);
            previous_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    snake
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
