//! Property tests: registry contents do not depend on the order schema
//! files are added in, and the pipeline preserves declared field names.

mod common;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use mfac_core::{MessageType, NamingPolicy};
use mfac_loader::Factory;
use proptest::prelude::*;

use common::{message_schema, write_schema, TestCompiler, ADDRESS};

const SCHEMAS: &[(&str, &str)] = &[
    ("address.idl", ADDRESS),
    ("color.idl", "enum Shade {\n  LIGHT = 0;\n  DARK = 1;\n}\nmessage Color {\n  Shade shade = 1;\n  uint32 rgb = 2;\n}\n"),
    ("event.idl", "message Event {\n  int64 at = 1;\n  repeated string labels = 2;\n}\n"),
    ("token.idl", "message Token {\n  bytes value = 1;\n  bool revoked = 2;\n}\n"),
];

fn write_all(dir: &Path) -> Vec<PathBuf> {
    SCHEMAS
        .iter()
        .map(|(name, text)| write_schema(dir, name, text))
        .collect()
}

fn snapshot(factory: &Factory) -> BTreeMap<String, MessageType> {
    factory
        .keys()
        .into_iter()
        .filter_map(|k| Some((k.to_string(), MessageType::clone(&*factory.message_class(k)?))))
        .collect()
}

fn build(policy: NamingPolicy, files: &[PathBuf], one_by_one: bool) -> BTreeMap<String, MessageType> {
    let ws = tempfile::tempdir().unwrap();
    let mut factory = Factory::with_compiler(Some(ws.path()), policy, TestCompiler::new()).unwrap();
    if one_by_one {
        for file in files {
            assert!(factory.add_file(file).unwrap().is_complete());
        }
    } else {
        assert!(factory.add_files(files).unwrap().is_complete());
    }
    snapshot(&factory)
}

fn naming_policy() -> impl Strategy<Value = NamingPolicy> {
    prop_oneof![Just(NamingPolicy::MessageName), Just(NamingPolicy::FileName)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn add_order_does_not_change_registry(
        order in Just((0..SCHEMAS.len()).collect::<Vec<_>>()).prop_shuffle(),
        one_by_one in any::<bool>(),
        policy in naming_policy(),
    ) {
        let src = tempfile::tempdir().unwrap();
        let files = write_all(src.path());
        let baseline = build(policy, &files, false);

        let shuffled: Vec<PathBuf> = order.iter().map(|&i| files[i].clone()).collect();
        let registry = build(policy, &shuffled, one_by_one);

        prop_assert_eq!(registry.len(), SCHEMAS.len());
        prop_assert_eq!(registry, baseline);
    }

    #[test]
    fn compiled_type_keeps_declared_field_names(
        fields in prop::collection::btree_set("[a-z][a-z0-9_]{0,8}", 1..6),
    ) {
        let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
        let src = tempfile::tempdir().unwrap();
        let ws = tempfile::tempdir().unwrap();
        let schema = write_schema(src.path(), "sample.idl", &message_schema("Sample", &fields));

        let mut factory =
            Factory::with_compiler(Some(ws.path()), NamingPolicy::MessageName, TestCompiler::new()).unwrap();
        prop_assert!(factory.add_file(&schema).unwrap().is_complete());

        let prototype = factory.prototype("Sample").unwrap();
        let tree = mfac_core::to_tree(&prototype);
        let keys: Vec<&str> = tree.as_object().unwrap().keys().map(String::as_str).collect();
        prop_assert_eq!(keys, fields);
    }
}
