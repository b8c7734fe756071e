//! Port implementation: which port interfaces the adapter structs satisfy.
//!
//! Matching is by method name only. Parameter and result types are not
//! compared, and pointer and value receivers both contribute to a struct's
//! method set. Methods are merged across all files of the struct's package
//! directory.

use super::SourceUnit;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A port interface and its required method names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceSpec {
    pub name: String,
    pub methods: BTreeSet<String>,
    pub file: String,
    pub line: usize,
}

/// An adapter struct and the port interfaces it satisfies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructImplementation {
    pub struct_name: String,
    /// Repository-relative file declaring the struct
    pub file: PathBuf,
    pub line: usize,
    /// Names of satisfied interfaces
    pub implemented: BTreeSet<String>,
}

#[derive(Debug)]
struct AdapterStruct {
    name: String,
    file: PathBuf,
    line: usize,
}

#[derive(Debug, Default)]
pub struct InterfaceImplementation {
    interfaces: BTreeMap<String, InterfaceSpec>,
    structs: Vec<AdapterStruct>,
    /// (package dir, receiver type) → method names
    methods: BTreeMap<(PathBuf, String), BTreeSet<String>>,
}

impl InterfaceImplementation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect interfaces from a ports file. A later declaration of the same
    /// name replaces the earlier one.
    pub fn add_port_file(&mut self, unit: &SourceUnit) {
        let Some(go) = &unit.go else {
            return;
        };
        for iface in &go.interfaces {
            self.interfaces.insert(
                iface.name.clone(),
                InterfaceSpec {
                    name: iface.name.clone(),
                    methods: iface.methods.clone(),
                    file: unit.display_path(),
                    line: iface.line,
                },
            );
        }
    }

    /// Collect struct declarations and receiver methods from an adapters file
    pub fn add_adapter_file(&mut self, unit: &SourceUnit) {
        let Some(go) = &unit.go else {
            return;
        };
        let package_dir = package_dir(&unit.path);
        for decl in &go.structs {
            self.structs.push(AdapterStruct {
                name: decl.name.clone(),
                file: unit.path.clone(),
                line: decl.line,
            });
        }
        for func in &go.functions {
            if let Some(receiver) = &func.receiver {
                self.methods
                    .entry((package_dir.clone(), receiver.type_name.clone()))
                    .or_default()
                    .insert(func.name.clone());
            }
        }
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &InterfaceSpec> {
        self.interfaces.values()
    }

    pub fn interface_count(&self) -> usize {
        self.interfaces.len()
    }

    /// Every adapter struct with the interfaces it satisfies, in file order
    pub fn implementations(&self) -> Vec<StructImplementation> {
        let empty = BTreeSet::new();
        self.structs
            .iter()
            .map(|s| {
                let methods = self
                    .methods
                    .get(&(package_dir(&s.file), s.name.clone()))
                    .unwrap_or(&empty);
                let implemented: BTreeSet<String> = self
                    .interfaces
                    .values()
                    .filter(|iface| iface.methods.is_subset(methods))
                    .map(|iface| iface.name.clone())
                    .collect();
                debug!(
                    adapter = %s.name,
                    implemented = implemented.len(),
                    "checked adapter struct"
                );
                StructImplementation {
                    struct_name: s.name.clone(),
                    file: s.file.clone(),
                    line: s.line,
                    implemented,
                }
            })
            .collect()
    }
}

fn package_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PORTS: &str = r#"package ports

type ItemRepository interface {
	Save(item Item) error
	FindByID(id int) (*Item, error)
}

type Notifier interface {
	Notify(msg string) error
}
"#;

    fn checker() -> InterfaceImplementation {
        let mut c = InterfaceImplementation::new();
        c.add_port_file(&SourceUnit::from_text("internal/core/ports/ports.go", PORTS));
        c
    }

    #[test]
    fn struct_implementing_both_ports() {
        let mut c = checker();
        c.add_adapter_file(&SourceUnit::from_text(
            "internal/adapters/store/store.go",
            r#"package store

type Store struct{}

func (s *Store) Save(item Item) error { return nil }
func (s *Store) FindByID(id int) (*Item, error) { return nil, nil }
func (s Store) Notify(msg string) error { return nil }
"#,
        ));
        c.add_adapter_file(&SourceUnit::from_text(
            "internal/adapters/cache/cache.go",
            "package cache\n\ntype Cache struct{}\n\nfunc (c *Cache) Get() {}\n",
        ));

        assert_eq!(c.interface_count(), 2);
        let impls = c.implementations();
        let store = impls.iter().find(|i| i.struct_name == "Store").unwrap();
        assert_eq!(store.implemented.len(), 2);
        assert_eq!(store.line, 3);
        let cache = impls.iter().find(|i| i.struct_name == "Cache").unwrap();
        assert!(cache.implemented.is_empty());
    }

    #[test]
    fn methods_merge_across_package_files() {
        let mut c = checker();
        c.add_adapter_file(&SourceUnit::from_text(
            "internal/adapters/store/store.go",
            "package store\n\ntype Store struct{}\n\nfunc (s *Store) Save(item Item) error { return nil }\n",
        ));
        c.add_adapter_file(&SourceUnit::from_text(
            "internal/adapters/store/find.go",
            "package store\n\nfunc (s *Store) FindByID(id int) (*Item, error) { return nil, nil }\n",
        ));
        let impls = c.implementations();
        assert_eq!(
            impls[0].implemented,
            BTreeSet::from(["ItemRepository".to_string()])
        );
    }

    #[test]
    fn same_name_in_other_package_does_not_count() {
        let mut c = checker();
        c.add_adapter_file(&SourceUnit::from_text(
            "internal/adapters/a/a.go",
            "package a\n\ntype Store struct{}\n",
        ));
        c.add_adapter_file(&SourceUnit::from_text(
            "internal/adapters/b/b.go",
            "package b\n\nfunc (s *Store) Notify(msg string) error { return nil }\n",
        ));
        assert!(c.implementations()[0].implemented.is_empty());
    }
}
