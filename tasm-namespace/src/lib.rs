//! The namespace interchange format: a serde-serializable dump of
//! `routine name -> (group id, instructions)`, matching the original
//! Python driver's `json.dump({"routines": namespace}, ...)` contract
//! (spec §2a, supplemented from `original_source/tasm_parser.py`'s
//! `determine_groups`). An external interpreter process (out of scope
//! for this crate, see spec §1) is the intended consumer of this JSON;
//! this crate only produces and can re-read it.

use std::fmt;
use std::io;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One instruction as handed to the interpreter: the mnemonic plus its
/// already-alias-substituted, comma-split argument tokens — not the
/// typed [`Operand`](../tasmc/types/enum.Operand.html) the core emitter
/// uses, since the interchange format is consumed by a process outside
/// this crate's type system.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceInstruction {
    pub mnemonic: String,
    pub args: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceRoutine {
    pub group: i32,
    pub instructions: Vec<NamespaceInstruction>,
}

/// Ordered `routine name -> NamespaceRoutine` mapping. A plain
/// `HashMap` would serialize with an unspecified key order; declaration
/// order is load-bearing here (it's exactly the `group_id` assignment
/// order), so this wraps a `Vec` of pairs and serializes/deserializes
/// as a JSON object by hand rather than pulling in a separate
/// ordered-map crate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Namespace {
    routines: Vec<(String, NamespaceRoutine)>,
}

impl Namespace {
    pub fn new() -> Self {
        Namespace::default()
    }

    pub fn push(&mut self, name: impl Into<String>, routine: NamespaceRoutine) {
        self.routines.push((name.into(), routine));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NamespaceRoutine)> {
        self.routines.iter().map(|(name, r)| (name.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.routines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routines.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.routines.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&NamespaceRoutine> {
        self.routines.iter().find(|(n, _)| n == name).map(|(_, r)| r)
    }
}

impl Serialize for Namespace {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.routines.len()))?;
        for (name, routine) in &self.routines {
            map.serialize_entry(name, routine)?;
        }
        map.end()
    }
}

struct NamespaceVisitor;

impl<'de> Visitor<'de> for NamespaceVisitor {
    type Value = Namespace;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a JSON object mapping routine name to its group/instructions")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Namespace, A::Error> {
        let mut routines = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((name, routine)) = access.next_entry::<String, NamespaceRoutine>()? {
            routines.push((name, routine));
        }
        Ok(Namespace { routines })
    }
}

impl<'de> Deserialize<'de> for Namespace {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Namespace, D::Error> {
        deserializer.deserialize_map(NamespaceVisitor)
    }
}

/// Top-level document written to `namespace.json`, mirroring the
/// reference implementation's `{"routines": namespace}` wrapper.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceDocument {
    pub routines: Namespace,
}

pub fn write_json<W: io::Write>(writer: W, namespace: &Namespace) -> io::Result<()> {
    let doc = NamespaceDocument { routines: namespace.clone() };
    serde_json::to_writer_pretty(writer, &doc)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

pub fn read_json<R: io::Read>(reader: R) -> io::Result<Namespace> {
    let doc: NamespaceDocument =
        serde_json::from_reader(reader).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(doc.routines)
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Namespace {
        let mut ns = Namespace::new();
        ns.push(
            "_init",
            NamespaceRoutine {
                group: 0,
                instructions: vec![NamespaceInstruction {
                    mnemonic: "MALLOC".to_string(),
                    args: vec!["4".to_string()],
                }],
            },
        );
        ns.push(
            "_start",
            NamespaceRoutine {
                group: 1,
                instructions: vec![NamespaceInstruction {
                    mnemonic: "NOP".to_string(),
                    args: vec![],
                }],
            },
        );
        ns
    }

    #[test]
    fn json_round_trip_preserves_declaration_order() {
        let ns = sample();
        let mut buf = Vec::new();
        write_json(&mut buf, &ns).unwrap();
        let read_back = read_json(&buf[..]).unwrap();
        assert_eq!(ns, read_back);
        assert_eq!(read_back.names(), vec!["_init", "_start"]);
    }

    #[test]
    fn serialized_keys_appear_in_push_order_not_alphabetical() {
        let ns = sample();
        let mut buf = Vec::new();
        write_json(&mut buf, &ns).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.find("_init").unwrap() < text.find("_start").unwrap());
    }
}
