use super::{Element, HashResource, ListResource};
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::Serialize;

// Profiles are plain JSON trees: `undef` and `null` both become `null`
// (a validated profile contains neither).

impl Serialize for Element {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Element::Undef | Element::Null => serializer.serialize_unit(),
            Element::Boolean(b) => serializer.serialize_bool(*b),
            Element::Long(n) => serializer.serialize_i64(*n),
            Element::Double(x) => serializer.serialize_f64(*x),
            Element::String(s) => serializer.serialize_str(s),
            Element::List(l) => l.serialize(serializer),
            Element::Hash(h) => h.serialize(serializer),
        }
    }
}

impl Serialize for ListResource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for child in self.iter() {
            seq.serialize_element(child)?;
        }
        seq.end()
    }
}

impl Serialize for HashResource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, child) in self.iter() {
            map.serialize_entry(key, child)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_nested_tree() {
        let mut root = HashResource::new();
        root.insert("name", Element::from("node01"));
        root.insert(
            "disks",
            Element::List(ListResource::from_vec(vec![
                Element::Long(10),
                Element::Double(1.5),
            ])),
        );
        root.insert("up", Element::Boolean(true));

        let json = serde_json::to_string(&Element::Hash(root)).unwrap();
        assert_eq!(json, r#"{"name":"node01","disks":[10,1.5],"up":true}"#);
    }
}
