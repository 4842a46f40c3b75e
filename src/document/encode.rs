//! Catalogue → document.
//!
//! The pool is sorted first and then serialized through borrowed view
//! structs, so nothing is cloned and the field elision rules live in one
//! place (the `skip_serializing_if` attributes below).
//!
//! An unset order is only elided on the first entry of a container. Any
//! later unset entry is written as its effective order, otherwise decoding
//! would hand it a generated order and move it.

use crate::catalog::{Category, Face, Pool};
use crate::order;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::io::Write;

/// Encode a pool as pretty-printed JSON in canonical form.
pub fn encode_pool(pool: &mut Pool) -> Result<String, serde_json::Error> {
    pool.sort_if_needed();
    serde_json::to_string_pretty(&PoolDoc::new(pool))
}

/// Like [`encode_pool`], streaming into `writer`.
pub fn encode_pool_to_writer<W: Write>(pool: &mut Pool, writer: W) -> Result<(), serde_json::Error> {
    pool.sort_if_needed();
    serde_json::to_writer_pretty(writer, &PoolDoc::new(pool))
}

/// A single line becomes a bare string, anything longer an array.
#[derive(Serialize)]
#[serde(untagged)]
enum Lines<'a> {
    One(&'a str),
    Many(&'a [String]),
}

impl<'a> Lines<'a> {
    fn new(lines: &'a [String]) -> Option<Self> {
        match lines {
            [] => None,
            [line] => Some(Lines::One(line)),
            many => Some(Lines::Many(many)),
        }
    }
}

#[derive(Serialize)]
struct PoolDoc<'a> {
    #[serde(rename = "name", skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(rename = "description", skip_serializing_if = "Option::is_none")]
    description: Option<Lines<'a>>,
    #[serde(rename = "credits", skip_serializing_if = "Option::is_none")]
    credits: Option<Lines<'a>>,
    #[serde(rename = "categories", serialize_with = "categories_map")]
    categories: &'a [Category],
}

impl<'a> PoolDoc<'a> {
    fn new(pool: &'a Pool) -> Self {
        Self {
            name: pool.name(),
            description: Lines::new(pool.description()),
            credits: Lines::new(pool.credits()),
            categories: pool.categories_unsorted(),
        }
    }
}

fn categories_map<S: Serializer>(categories: &&[Category], s: S) -> Result<S::Ok, S::Error> {
    let mut map = s.serialize_map(Some(categories.len()))?;
    for (i, category) in categories.iter().enumerate() {
        map.serialize_entry(category.name(), &CategoryDoc::new(category, i == 0))?;
    }
    map.end()
}

#[derive(Serialize)]
struct CategoryDoc<'a> {
    #[serde(rename = "order", skip_serializing_if = "Option::is_none")]
    order: Option<i64>,
    #[serde(rename = "characterName", skip_serializing_if = "Option::is_none")]
    character_name: Option<&'a str>,
    #[serde(rename = "description", skip_serializing_if = "Option::is_none")]
    description: Option<Lines<'a>>,
    #[serde(rename = "faces", serialize_with = "faces_map")]
    faces: &'a [Face],
}

impl<'a> CategoryDoc<'a> {
    fn new(category: &'a Category, first: bool) -> Self {
        Self {
            order: written_order(category.order(), first),
            character_name: category.character_name(),
            description: Lines::new(category.description()),
            faces: category.faces_unsorted(),
        }
    }
}

fn faces_map<S: Serializer>(faces: &&[Face], s: S) -> Result<S::Ok, S::Error> {
    let mut map = s.serialize_map(Some(faces.len()))?;
    for (i, face) in faces.iter().enumerate() {
        map.serialize_entry(face.name(), &FaceDoc::new(face, i == 0))?;
    }
    map.end()
}

/// Order as written for an entry at a sorted position.
fn written_order(order: Option<i64>, first: bool) -> Option<i64> {
    match order {
        None if !first => Some(order::effective_order(None)),
        order => order,
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum FaceDoc<'a> {
    Path(&'a str),
    Full(FaceObject<'a>),
}

#[derive(Serialize)]
struct FaceObject<'a> {
    #[serde(rename = "path")]
    path: &'a str,
    #[serde(rename = "order", skip_serializing_if = "Option::is_none")]
    order: Option<i64>,
    #[serde(rename = "characterName", skip_serializing_if = "Option::is_none")]
    character_name: Option<&'a str>,
    #[serde(rename = "description", skip_serializing_if = "Option::is_none")]
    description: Option<Lines<'a>>,
}

impl<'a> FaceDoc<'a> {
    fn new(face: &'a Face, first: bool) -> Self {
        let object = FaceObject {
            path: face.image_path(),
            order: written_order(face.order(), first),
            character_name: face.character_name(),
            description: Lines::new(face.description()),
        };
        if object.order.is_none() && object.character_name.is_none() && object.description.is_none()
        {
            FaceDoc::Path(object.path)
        } else {
            FaceDoc::Full(object)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn encode_value(pool: &mut Pool) -> Value {
        serde_json::from_str(&encode_pool(pool).unwrap()).unwrap()
    }

    #[test]
    fn empty_unnamed_pool() {
        let mut pool = Pool::new();
        assert_eq!(encode_value(&mut pool), json!({ "categories": {} }));
    }

    #[test]
    fn plain_face_is_bare_path() {
        let mut pool = Pool::named("p");
        let mut category = Category::new("A");
        category.add(Face::new("a", "a.png")).unwrap();
        pool.add(category).unwrap();

        assert_eq!(
            encode_value(&mut pool),
            json!({
                "name": "p",
                "categories": { "A": { "faces": { "a": "a.png" } } }
            })
        );
    }

    #[test]
    fn face_with_metadata_is_object() {
        let mut pool = Pool::new();
        let mut category = Category::new("A");
        let mut face = Face::new("a", "a.png");
        face.set_character_name("Someone");
        face.description_mut().extend(["one".to_string(), "two".to_string()]);
        category.add(face).unwrap();
        pool.add(category).unwrap();

        assert_eq!(
            encode_value(&mut pool)["categories"]["A"]["faces"]["a"],
            json!({
                "path": "a.png",
                "characterName": "Someone",
                "description": ["one", "two"]
            })
        );
    }

    #[test]
    fn single_line_description_is_bare_string() {
        let mut pool = Pool::new();
        pool.set_description(vec!["only line".into()]);
        pool.set_credits(vec!["a".into(), "b".into()]);
        let value = encode_value(&mut pool);
        assert_eq!(value["description"], json!("only line"));
        assert_eq!(value["credits"], json!(["a", "b"]));
    }

    #[test]
    fn empty_description_is_omitted() {
        let mut pool = Pool::new();
        let mut category = Category::new("A");
        let mut face = Face::new("a", "a.png");
        face.description_mut();
        category.add(face).unwrap();
        pool.add(category).unwrap();

        let value = encode_value(&mut pool);
        assert_eq!(value["categories"]["A"]["faces"]["a"], json!("a.png"));
    }

    #[test]
    fn default_orders_are_written() {
        let mut pool = Pool::new();
        let mut category = Category::new("A");
        category.add(Face::new("first", "1.png")).unwrap();
        category.add(Face::new("second", "2.png")).unwrap();
        pool.add(category).unwrap();
        pool.add(Category::new("B")).unwrap();

        let value = encode_value(&mut pool);
        assert_eq!(value["categories"]["A"].get("order"), None);
        assert_eq!(value["categories"]["B"]["order"], json!(1000));
        assert_eq!(
            value["categories"]["A"]["faces"]["second"],
            json!({ "path": "2.png", "order": 1000 })
        );
    }

    #[test]
    fn keys_follow_display_order() {
        let mut pool = Pool::new();
        let mut late = Category::new("late");
        late.set_order(5000);
        pool.add(late).unwrap();
        let mut early = Category::new("early");
        early.set_order(-10);
        pool.add(early).unwrap();

        let json = encode_pool(&mut pool).unwrap();
        let early_at = json.find("\"early\"").unwrap();
        let late_at = json.find("\"late\"").unwrap();
        assert!(early_at < late_at);
        assert!(!pool.is_dirty());
    }

    #[test]
    fn unset_order_after_first_entry_is_written_as_zero() {
        let mut pool = Pool::new();
        let mut category = Category::new("A");
        let mut below = Face::new("below", "b.png");
        below.set_order(-5);
        category.add(Face::new("unset", "u.png")).unwrap();
        category.add(below).unwrap();
        pool.add(category).unwrap();

        let value = encode_value(&mut pool);
        assert_eq!(value["categories"]["A"]["faces"]["below"]["order"], json!(-5));
        assert_eq!(
            value["categories"]["A"]["faces"]["unset"],
            json!({ "path": "u.png", "order": 0 })
        );
        assert_eq!(value["categories"]["A"].get("order"), None);
    }

    #[test]
    fn writer_output_matches_string() {
        let mut pool = Pool::named("p");
        pool.add(Category::new("A")).unwrap();
        let mut buf = Vec::new();
        encode_pool_to_writer(&mut pool, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), encode_pool(&mut pool).unwrap());
    }
}
