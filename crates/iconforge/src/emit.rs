//! Dart source generation for a glyph map.
use crate::{
    dart::{Arg, DartClass, DartField, DartFormatter, DartLibrary, Expr},
    error::EmitError,
    glyph::GlyphMap,
    sanitize::sanitize,
};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

pub const ICON_TYPE: &str = "IconData";
pub const FAMILY_FIELD: &str = "fontFamily";
pub const PACKAGE_FIELD: &str = "fontPackage";
pub const AGGREGATE_FIELD: &str = "values";
pub const FLUTTER_IMPORT: &str = "package:flutter/widgets.dart";

pub struct EmitRequest<'a> {
    pub class_name: &'a str,
    pub package: Option<&'a str>,
    pub glyph_map: &'a GlyphMap,
    /// Glyph name to the file it was built from, for the doc comments.
    pub source_paths: &'a BTreeMap<String, PathBuf>,
    pub include_aggregate: bool,
}

/// Builds the generated class and returns it formatted.
pub fn emit(request: &EmitRequest<'_>) -> Result<String, EmitError> {
    DartFormatter::default().format(&build_module(request)?)
}

pub fn build_module(request: &EmitRequest<'_>) -> Result<DartLibrary, EmitError> {
    let mut names = IdentifierTable::new([
        request.class_name,
        FAMILY_FIELD,
        PACKAGE_FIELD,
        AGGREGATE_FIELD,
    ]);

    let mut fields = vec![
        DartField {
            docs: vec!["Font family the icons are registered under.".into()],
            ty: "String".into(),
            name: FAMILY_FIELD.into(),
            value: Expr::Str(request.class_name.into()),
        },
        DartField {
            docs: vec!["Package bundling the font, `null` for the application itself.".into()],
            ty: "String?".into(),
            name: PACKAGE_FIELD.into(),
            value: request
                .package
                .map_or(Expr::Null, |p| Expr::Str(p.into())),
        },
    ];

    let mut entries = Vec::with_capacity(request.glyph_map.len());
    for glyph in request.glyph_map {
        let path = request
            .source_paths
            .get(&glyph.name)
            .ok_or_else(|| EmitError::MissingSourcePath(glyph.name.clone()))?;
        let ident = names.allocate(&glyph.name);
        fields.push(DartField {
            docs: vec![format!(
                "`{}` (U+{:04X}), from `{}`.",
                glyph.name,
                glyph.code_point,
                display_path(path)
            )],
            ty: ICON_TYPE.into(),
            name: ident.clone(),
            value: Expr::Call {
                callee: ICON_TYPE.into(),
                args: vec![
                    Arg::Positional(Expr::Hex(glyph.code_point)),
                    Arg::Named(FAMILY_FIELD.into(), Expr::Member(FAMILY_FIELD.into())),
                    Arg::Named(PACKAGE_FIELD.into(), Expr::Member(PACKAGE_FIELD.into())),
                ],
            },
        });
        entries.push((Expr::Str(glyph.name.clone()), Expr::Member(ident)));
    }

    if request.include_aggregate {
        fields.push(DartField {
            docs: vec!["All icons by their original name.".into()],
            ty: format!("Map<String, {ICON_TYPE}>"),
            name: AGGREGATE_FIELD.into(),
            value: Expr::Map {
                key_type: "String".into(),
                value_type: ICON_TYPE.into(),
                entries,
            },
        });
    }

    Ok(DartLibrary {
        header: vec![
            "GENERATED CODE - DO NOT MODIFY BY HAND".into(),
            "Generated by iconforge.".into(),
            String::new(),
            "ignore_for_file: constant_identifier_names".into(),
        ],
        imports: vec![FLUTTER_IMPORT.into()],
        classes: vec![DartClass {
            docs: vec![format!("Icon constants for the `{}` font.", request.class_name)],
            name: request.class_name.into(),
            fields,
        }],
    })
}

/// Hands out unique identifiers within one generated class.
struct IdentifierTable {
    taken: HashSet<String>,
}

impl IdentifierTable {
    fn new<'a>(reserved: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            taken: reserved.into_iter().map(str::to_string).collect(),
        }
    }

    /// Sanitizes `name`; on collision appends `_2`, `_3`, ...
    fn allocate(&mut self, name: &str) -> String {
        let base = sanitize(name);
        let mut ident = base.clone();
        let mut n = 2;
        while self.taken.contains(&ident) {
            ident = format!("{base}_{n}");
            n += 1;
        }
        self.taken.insert(ident.clone());
        ident
    }
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>(
        glyph_map: &'a GlyphMap,
        paths: &'a BTreeMap<String, PathBuf>,
    ) -> EmitRequest<'a> {
        EmitRequest {
            class_name: "MyIcons",
            package: None,
            glyph_map,
            source_paths: paths,
            include_aggregate: true,
        }
    }

    fn paths_for(map: &GlyphMap) -> BTreeMap<String, PathBuf> {
        map.names()
            .map(|n| (n.to_string(), PathBuf::from(format!("{n}.svg"))))
            .collect()
    }

    fn field_names(lib: &DartLibrary) -> Vec<&str> {
        lib.classes[0]
            .fields
            .iter()
            .map(|f| f.name.as_str())
            .collect()
    }

    #[test]
    fn colliding_identifiers_get_numeric_suffixes() {
        let mut map = GlyphMap::new();
        map.insert("home-icon", 0xE000);
        map.insert("home_icon", 0xE001);
        map.insert("Home Icon", 0xE002);
        let paths = paths_for(&map);
        let lib = build_module(&request(&map, &paths)).unwrap();
        assert_eq!(
            field_names(&lib),
            vec![
                FAMILY_FIELD,
                PACKAGE_FIELD,
                "home_icon",
                "home_icon_2",
                "home_icon_3",
                AGGREGATE_FIELD
            ]
        );
    }

    #[test]
    fn member_names_are_never_reused() {
        let mut map = GlyphMap::new();
        map.insert("values", 0xE000);
        let paths = paths_for(&map);
        let lib = build_module(&request(&map, &paths)).unwrap();
        assert_eq!(field_names(&lib)[2], "values_2");
    }

    #[test]
    fn aggregate_is_optional() {
        let mut map = GlyphMap::new();
        map.insert("home", 0xE000);
        let paths = paths_for(&map);
        let mut req = request(&map, &paths);
        req.include_aggregate = false;
        let text = emit(&req).unwrap();
        assert!(!text.contains("values"));
    }

    #[test]
    fn missing_source_path_fails() {
        let mut map = GlyphMap::new();
        map.insert("home", 0xE000);
        let paths = BTreeMap::new();
        assert_eq!(
            emit(&request(&map, &paths)),
            Err(EmitError::MissingSourcePath("home".into()))
        );
    }

    #[test]
    fn package_constant_is_quoted() {
        let map = GlyphMap::new();
        let paths = BTreeMap::new();
        let mut req = request(&map, &paths);
        req.package = Some("my_app");
        let text = emit(&req).unwrap();
        assert!(text.contains("static const String? fontPackage = 'my_app';"));
    }
}
