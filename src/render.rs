// SPDX-License-Identifier: MPL-2.0

//! Serialization of a [Document] into CUDF text.
//!
//! Solvers parse CUDF line by line, so the layout is fixed: a preamble block
//! if any, one block per package with its fields in a fixed order, then the
//! request. Blocks are separated by a blank line.

use crate::cudf::{DisplayList, Document, PackageList, Property, PropertyType};
use crate::RenderError;

/// Line terminator used throughout a rendered document.
#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
/// Line terminator used throughout a rendered document.
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

/// Render `doc` as CUDF text.
///
/// Nothing is produced when a preamble property cannot be expressed, see
/// [RenderError::UnrenderableProperty]. The last line has no terminator.
pub fn render(doc: &Document) -> Result<String, RenderError> {
    let mut lines: Vec<String> = Vec::new();

    if let Some(preamble) = &doc.preamble {
        lines.push("preamble:".to_string());
        if !preamble.properties.is_empty() {
            let properties = preamble
                .properties
                .iter()
                .map(render_property)
                .collect::<Result<Vec<_>, _>>()?;
            lines.push(format!("property: {}", properties.join(", ")));
        }
        if let Some(checksum) = &preamble.universe_checksum {
            lines.push(format!("univ-checksum: {checksum}"));
        }
        if let Some(checksum) = &preamble.status_checksum {
            lines.push(format!("status-checksum: {checksum}"));
        }
        if let Some(checksum) = &preamble.request_checksum {
            lines.push(format!("req-checksum: {checksum}"));
        }
        lines.push(String::new());
    }

    for package in &doc.universe {
        lines.push(format!("package: {}", package.package));
        lines.push(format!("version: {}", package.version));
        lines.push(format!("installed: {}", package.installed));
        if let Some(was_installed) = package.was_installed {
            lines.push(format!("was-installed: {was_installed}"));
        }
        if let Some(depends) = package.depends.as_ref().filter(|f| !f.is_empty()) {
            lines.push(format!("depends: {depends}"));
        }
        push_list(&mut lines, "conflicts", package.conflicts.as_ref());
        push_list(&mut lines, "provides", package.provides.as_ref());
        if let Some(keep) = package.keep {
            lines.push(format!("keep: {keep}"));
        }
        lines.push(String::new());
    }

    lines.push("request:".to_string());
    push_list(&mut lines, "install", doc.request.install.as_ref());
    push_list(&mut lines, "remove", doc.request.remove.as_ref());
    push_list(&mut lines, "upgrade", doc.request.upgrade.as_ref());

    Ok(lines.join(LINE_ENDING))
}

fn push_list(lines: &mut Vec<String>, key: &str, list: Option<&PackageList>) {
    if let Some(list) = list.filter(|list| !list.is_empty()) {
        lines.push(format!("{key}: {}", DisplayList(list)));
    }
}

/// `name : type = [ default ]`
fn render_property(property: &Property) -> Result<String, RenderError> {
    let unrenderable = |reason: String| RenderError::UnrenderableProperty {
        property: property.name.clone(),
        reason,
    };

    if let PropertyType::Enum(values) = &property.property_type {
        if values.is_empty() {
            return Err(unrenderable("enum type without values".to_string()));
        }
    }

    let mut rendered = format!("{} : {}", property.name, property.property_type);
    if let Some(default) = &property.default {
        if !default_fits(&property.property_type, default) {
            return Err(unrenderable(format!(
                "default value {default:?} is not a valid {}",
                property.property_type
            )));
        }
        rendered.push_str(&format!(" = [ {default} ]"));
    }
    Ok(rendered)
}

fn default_fits(property_type: &PropertyType, default: &str) -> bool {
    match property_type {
        PropertyType::String => true,
        PropertyType::Int => default.parse::<i64>().is_ok(),
        PropertyType::PosInt => default.parse::<u64>().is_ok_and(|n| n > 0),
        PropertyType::Bool => matches!(default, "true" | "false"),
        PropertyType::Enum(values) => values.iter().any(|value| value == default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cudf::{Constraint, Keep, Package, Preamble, RelOp, Request};

    fn lines(text: &str) -> Vec<&str> {
        text.split(LINE_ENDING).collect()
    }

    #[test]
    fn lone_package() {
        let doc = Document {
            universe: vec![Package::new("app", 1_000_000)],
            ..Document::default()
        };
        assert_eq!(
            render(&doc).unwrap(),
            ["package: app", "version: 1000000", "installed: false", "", "request:"]
                .join(LINE_ENDING)
        );
    }

    #[test]
    fn empty_document_is_just_the_request() {
        assert_eq!(render(&Document::default()).unwrap(), "request:");
    }

    #[test]
    fn package_fields_keep_their_order() {
        let mut package = Package::new("a", 2);
        package.installed = true;
        package.was_installed = Some(false);
        package.depends = Some(
            vec![
                vec![Constraint::new("b", RelOp::Geq, 1), Constraint::new("c", RelOp::Eq, 3)],
                vec![Constraint::new("d", RelOp::Lt, 7)],
            ]
            .into(),
        );
        package.conflicts = Some(vec![
            Constraint::new("e", RelOp::Neq, 1),
            Constraint::new("f", RelOp::Gt, 2),
        ]);
        package.provides = Some(vec![Constraint::new("g", RelOp::Eq, 1)]);
        package.keep = Some(Keep::Feature);

        let doc = Document {
            universe: vec![package],
            ..Document::default()
        };
        assert_eq!(
            lines(&render(&doc).unwrap()),
            [
                "package: a",
                "version: 2",
                "installed: true",
                "was-installed: false",
                "depends: b >= 1 | c = 3, d < 7",
                "conflicts: e != 1, f > 2",
                "provides: g = 1",
                "keep: feature",
                "",
                "request:",
            ]
        );
    }

    #[test]
    fn empty_relationships_are_left_out() {
        let mut package = Package::new("a", 1);
        package.depends = Some(Default::default());
        package.conflicts = Some(Vec::new());
        let doc = Document {
            universe: vec![package],
            ..Document::default()
        };
        assert_eq!(
            lines(&render(&doc).unwrap()),
            ["package: a", "version: 1", "installed: false", "", "request:"]
        );
    }

    #[test]
    fn preamble_and_request() {
        let doc = Document {
            preamble: Some(Preamble {
                properties: vec![
                    Property::new("name", PropertyType::String),
                    Property::new("priority", PropertyType::PosInt).with_default("1"),
                    Property::new("arch", PropertyType::Enum(vec!["x86".into(), "arm".into()]))
                        .with_default("arm"),
                ],
                universe_checksum: Some("abc".to_string()),
                status_checksum: None,
                request_checksum: Some("def".to_string()),
            }),
            universe: Vec::new(),
            request: Request {
                install: Some(vec![
                    Constraint::new("a", RelOp::Geq, 0),
                    Constraint::new("b", RelOp::Eq, 1000000),
                ]),
                remove: Some(vec![Constraint::new("c", RelOp::Leq, 3)]),
                upgrade: None,
            },
        };
        assert_eq!(
            lines(&render(&doc).unwrap()),
            [
                "preamble:",
                "property: name : string, priority : posint = [ 1 ], arch : enum [ x86, arm ] = [ arm ]",
                "univ-checksum: abc",
                "req-checksum: def",
                "",
                "request:",
                "install: a >= 0, b = 1000000",
                "remove: c <= 3",
            ]
        );
    }

    #[test]
    fn unrenderable_properties_fail_the_render() {
        let with_property = |property: Property| Document {
            preamble: Some(Preamble {
                properties: vec![property],
                ..Preamble::default()
            }),
            universe: vec![Package::new("a", 1)],
            ..Document::default()
        };

        let err = render(&with_property(Property::new("kind", PropertyType::Enum(Vec::new()))))
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::UnrenderableProperty { property, .. } if property == "kind"
        ));

        for property in [
            Property::new("flag", PropertyType::Bool).with_default("yes"),
            Property::new("count", PropertyType::PosInt).with_default("0"),
            Property::new("delta", PropertyType::Int).with_default("1.5"),
            Property::new("arch", PropertyType::Enum(vec!["x86".into()])).with_default("arm"),
        ] {
            assert!(render(&with_property(property)).is_err());
        }

        let ok = Property::new("delta", PropertyType::Int).with_default("-3");
        assert!(render(&with_property(ok)).is_ok());
    }
}
