//! Document → catalogue.
//!
//! Decoding streams straight into catalogue entities through
//! [`DeserializeSeed`]s, so a category is built (and its faces added, with
//! default orders assigned) while its JSON object is being read. The seeds
//! also carry a side slot for "missing required field" failures: serde only
//! lets a visitor return a message, and the slot keeps the entity kind and
//! field list intact for [`DecodeError::MissingFields`].

use super::fields;
use crate::catalog::{Category, EntityKind, Face, Pool};
use crate::order::OrderPolicy;
use serde::de::{self, DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    /// Grammar or structure violation: bad JSON, wrong value type, a
    /// category or face name defined twice.
    #[error("malformed face document: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("{kind} is missing required field(s) {} at line {line} column {column}", .fields.join(", "))]
    MissingFields {
        kind: EntityKind,
        fields: Vec<&'static str>,
        line: usize,
        column: usize,
    },
}

impl DecodeError {
    /// 1-based line of the failure.
    pub fn line(&self) -> usize {
        match self {
            DecodeError::Malformed(e) => e.line(),
            DecodeError::MissingFields { line, .. } => *line,
        }
    }

    /// 1-based column of the failure.
    pub fn column(&self) -> usize {
        match self {
            DecodeError::Malformed(e) => e.column(),
            DecodeError::MissingFields { column, .. } => *column,
        }
    }
}

/// Knobs for [`decode_pool`].
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    /// Spacing for default orders assigned while adding decoded entries.
    pub policy: OrderPolicy,
    /// Sort the pool before returning it.
    pub sort: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            policy: OrderPolicy::default(),
            sort: true,
        }
    }
}

/// Decode a pool document.
pub fn decode_pool(json: &str, options: &DecodeOptions) -> Result<Pool, DecodeError> {
    let missing = RefCell::new(None);
    let ctx = Ctx {
        options,
        missing: &missing,
    };

    let mut de = serde_json::Deserializer::from_str(json);
    let result = PoolSeed(ctx)
        .deserialize(&mut de)
        .and_then(|pool| de.end().map(|()| pool));

    result.map_err(|err| match missing.take() {
        Some(Missing { kind, fields }) => DecodeError::MissingFields {
            kind,
            fields,
            line: err.line(),
            column: err.column(),
        },
        None => DecodeError::Malformed(err),
    })
}

struct Missing {
    kind: EntityKind,
    fields: Vec<&'static str>,
}

#[derive(Clone, Copy)]
struct Ctx<'a> {
    options: &'a DecodeOptions,
    missing: &'a RefCell<Option<Missing>>,
}

impl Ctx<'_> {
    fn missing<E: de::Error>(&self, kind: EntityKind, fields: Vec<&'static str>) -> E {
        let err = E::custom(format!(
            "{kind} is missing required field(s) {}",
            fields.join(", ")
        ));
        *self.missing.borrow_mut() = Some(Missing { kind, fields });
        err
    }
}

/// A string or an array of strings.
struct StringList(Vec<String>);

impl<'de> Deserialize<'de> for StringList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StringListVisitor;

        impl<'de> Visitor<'de> for StringListVisitor {
            type Value = StringList;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a string or an array of strings")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<StringList, E> {
                Ok(StringList(vec![v.to_string()]))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<StringList, A::Error> {
                let mut lines = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(line) = seq.next_element::<String>()? {
                    lines.push(line);
                }
                Ok(StringList(lines))
            }
        }

        deserializer.deserialize_any(StringListVisitor)
    }
}

struct PoolSeed<'a>(Ctx<'a>);

impl<'de> DeserializeSeed<'de> for PoolSeed<'_> {
    type Value = Pool;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Pool, D::Error> {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for PoolSeed<'_> {
    type Value = Pool;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a face pool object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Pool, A::Error> {
        let ctx = self.0;
        let mut name = None;
        let mut description = Vec::new();
        let mut credits = Vec::new();
        let mut categories: Option<Vec<Category>> = None;

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                fields::NAME => name = Some(map.next_value::<String>()?),
                fields::DESCRIPTION => description = map.next_value::<StringList>()?.0,
                fields::CREDITS => credits = map.next_value::<StringList>()?.0,
                fields::CATEGORIES => {
                    let seen = categories.get_or_insert_with(Vec::new);
                    map.next_value_seed(CategoriesSeed { ctx, into: seen })?;
                }
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        let Some(categories) = categories else {
            return Err(ctx.missing(EntityKind::Pool, vec![fields::CATEGORIES]));
        };

        // Categories are attached only once the whole object is read: the
        // pool name (which decides source-pool links) may come last.
        let mut pool = Pool::with_policy(name, ctx.options.policy);
        pool.set_description(description);
        pool.set_credits(credits);
        for category in categories {
            pool.add(category).map_err(|e| de::Error::custom(e.error))?;
        }
        if ctx.options.sort {
            pool.sort_if_needed();
        }
        Ok(pool)
    }
}

struct CategoriesSeed<'a, 'p> {
    ctx: Ctx<'a>,
    into: &'p mut Vec<Category>,
}

impl<'de> DeserializeSeed<'de> for CategoriesSeed<'_, '_> {
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for CategoriesSeed<'_, '_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object of categories keyed by name")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<(), A::Error> {
        let mut names: HashSet<String> = self.into.iter().map(|c| c.name().to_string()).collect();
        while let Some(name) = map.next_key::<String>()? {
            if !names.insert(name.clone()) {
                return Err(de::Error::custom(format!(
                    "category with name \"{name}\" defined twice"
                )));
            }
            let category = map.next_value_seed(CategorySeed {
                ctx: self.ctx,
                name,
            })?;
            self.into.push(category);
        }
        Ok(())
    }
}

struct CategorySeed<'a> {
    ctx: Ctx<'a>,
    name: String,
}

impl<'de> DeserializeSeed<'de> for CategorySeed<'_> {
    type Value = Category;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Category, D::Error> {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for CategorySeed<'_> {
    type Value = Category;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "an object for category \"{}\"", self.name)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Category, A::Error> {
        let ctx = self.ctx;
        let mut category = Category::with_policy(self.name, ctx.options.policy);
        let mut got_faces = false;

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                fields::ORDER => category.set_order(map.next_value::<i64>()?),
                fields::CHARACTER_NAME => category.set_character_name(map.next_value::<String>()?),
                fields::DESCRIPTION => category.set_description(map.next_value::<StringList>()?.0),
                fields::FACES => {
                    map.next_value_seed(FacesSeed {
                        ctx,
                        into: &mut category,
                    })?;
                    got_faces = true;
                }
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        if !got_faces {
            return Err(ctx.missing(EntityKind::Category, vec![fields::FACES]));
        }
        Ok(category)
    }
}

struct FacesSeed<'a, 'c> {
    ctx: Ctx<'a>,
    into: &'c mut Category,
}

impl<'de> DeserializeSeed<'de> for FacesSeed<'_, '_> {
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for FacesSeed<'_, '_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object of faces keyed by name")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<(), A::Error> {
        while let Some(name) = map.next_key::<String>()? {
            let face = map.next_value_seed(FaceSeed {
                ctx: self.ctx,
                name,
            })?;
            self.into
                .add(face)
                .map_err(|e| de::Error::custom(e.error))?;
        }
        Ok(())
    }
}

struct FaceSeed<'a> {
    ctx: Ctx<'a>,
    name: String,
}

impl<'de> DeserializeSeed<'de> for FaceSeed<'_> {
    type Value = Face;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Face, D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for FaceSeed<'_> {
    type Value = Face;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "an image path or an object for face \"{}\"",
            self.name
        )
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Face, E> {
        Ok(Face::new(self.name, v))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Face, A::Error> {
        let mut path = None;
        let mut order = None;
        let mut character_name = None;
        let mut description = None;

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                fields::PATH | fields::IMAGE_PATH => path = Some(map.next_value::<String>()?),
                fields::ORDER => order = Some(map.next_value::<i64>()?),
                fields::CHARACTER_NAME => character_name = Some(map.next_value::<String>()?),
                fields::DESCRIPTION => description = Some(map.next_value::<StringList>()?.0),
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        let Some(path) = path else {
            return Err(self.ctx.missing(EntityKind::Face, vec![fields::PATH]));
        };

        let mut face = Face::new(self.name, path);
        if let Some(order) = order {
            face.set_order(order);
        }
        if let Some(character_name) = character_name {
            face.set_character_name(character_name);
        }
        if let Some(description) = description {
            *face.description_mut() = description;
        }
        Ok(face)
    }
}
