use serde_json::{Map, Value};

use super::{
    ClassMember, Declarator, FunctionKind, ImportSpecifier, Pattern, Property, Span, Syntax,
};

const METADATA_KEYS: [&str; 5] = ["type", "loc", "range", "start", "end"];

type Fields = Map<String, Value>;

fn node_fields(value: &Value) -> Option<(&str, &Fields)> {
    let fields = value.as_object()?;
    let kind = fields.get("type")?.as_str()?;
    Some((kind, fields))
}

pub(super) fn convert(value: &Value) -> Option<Syntax> {
    let (kind, fields) = node_fields(value)?;

    let converted = match kind {
        "Program" => Some(Syntax::Program {
            body: node_list(fields, "body"),
        }),
        "BlockStatement" | "StaticBlock" => Some(Syntax::Block {
            body: node_list(fields, "body"),
        }),
        "ImportDeclaration" => convert_import(fields),
        "VariableDeclaration" => Some(Syntax::Variables {
            declarations: list(fields, "declarations")
                .filter_map(|value| node_fields(value).map(|(_, fields)| fields))
                .map(convert_declarator)
                .collect(),
        }),
        "FunctionDeclaration" => convert_function(FunctionKind::Declaration, fields),
        "FunctionExpression" => convert_function(FunctionKind::Expression, fields),
        "ArrowFunctionExpression" => convert_function(FunctionKind::Arrow, fields),
        "ClassDeclaration" => Some(convert_class(false, fields)),
        "ClassExpression" => Some(convert_class(true, fields)),
        "CallExpression" => node_field(fields, "callee").map(|callee| Syntax::Call {
            callee: Box::new(callee),
            arguments: node_list(fields, "arguments"),
        }),
        "NewExpression" => node_field(fields, "callee").map(|callee| Syntax::New {
            callee: Box::new(callee),
            arguments: node_list(fields, "arguments"),
        }),
        "MemberExpression" => node_field(fields, "object")
            .zip(node_field(fields, "property"))
            .map(|(object, property)| Syntax::Member {
                object: Box::new(object),
                property: Box::new(property),
                computed: flag(fields, "computed"),
            }),
        "Identifier" => string(fields, "name").map(|name| Syntax::Identifier { name }),
        "Literal" => Some(Syntax::Literal {
            raw: literal_raw(fields),
        }),
        "ObjectExpression" => Some(Syntax::Object {
            properties: list(fields, "properties")
                .filter_map(convert_property)
                .collect(),
        }),
        "ArrayExpression" => Some(Syntax::Array {
            elements: node_list(fields, "elements"),
        }),
        "ExpressionStatement" => node_field(fields, "expression").map(|expression| {
            Syntax::Expression {
                expression: Box::new(expression),
            }
        }),
        _ => None,
    };

    // Anything unrecognised, or recognised but missing a required field, keeps
    // its nested nodes for generic descent.
    Some(converted.unwrap_or_else(|| generic(kind, fields)))
}

fn generic(kind: &str, fields: &Fields) -> Syntax {
    let mut children = Vec::new();
    for (key, value) in fields {
        if METADATA_KEYS.contains(&key.as_str()) {
            continue;
        }

        match value {
            Value::Array(items) => children.extend(items.iter().filter_map(convert)),
            Value::Object(_) => children.extend(convert(value)),
            _ => {}
        }
    }

    Syntax::Other {
        kind: kind.to_owned(),
        children,
    }
}

fn list<'a>(fields: &'a Fields, key: &str) -> impl Iterator<Item = &'a Value> {
    fields
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn node_list(fields: &Fields, key: &str) -> Vec<Syntax> {
    list(fields, key).filter_map(convert).collect()
}

fn node_field(fields: &Fields, key: &str) -> Option<Syntax> {
    fields.get(key).and_then(convert)
}

fn string(fields: &Fields, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn flag(fields: &Fields, key: &str) -> bool {
    fields.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn span(fields: &Fields) -> Option<Span> {
    let start = fields.get("start").and_then(Value::as_u64)?;
    let end = fields.get("end").and_then(Value::as_u64)?;
    Some(Span {
        start: usize::try_from(start).ok()?,
        end: usize::try_from(end).ok()?,
    })
}

fn identifier_name(value: Option<&Value>) -> Option<String> {
    let (kind, fields) = node_fields(value?)?;
    match kind {
        "Identifier" => string(fields, "name"),
        "PrivateIdentifier" => string(fields, "name").map(|name| format!("#{name}")),
        _ => None,
    }
}

fn literal_raw(fields: &Fields) -> String {
    if let Some(raw) = string(fields, "raw") {
        return raw;
    }

    fields
        .get("value")
        .map(Value::to_string)
        .unwrap_or_else(|| "null".to_owned())
}

fn property_key(fields: &Fields) -> String {
    let key = fields.get("key");
    if !flag(fields, "computed") {
        if let Some(name) = identifier_name(key) {
            return name;
        }
    }

    match key.and_then(node_fields) {
        Some(("Literal", literal)) => match literal.get("value") {
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => literal_raw(literal),
        },
        _ => "[computed]".to_owned(),
    }
}

fn convert_import(fields: &Fields) -> Option<Syntax> {
    let source = fields
        .get("source")
        .and_then(node_fields)
        .and_then(|(_, source)| string(source, "value"))?;

    let specifiers = list(fields, "specifiers")
        .filter_map(|value| {
            let (kind, specifier) = node_fields(value)?;
            let local = identifier_name(specifier.get("local"))?;
            Some(match kind {
                "ImportDefaultSpecifier" => ImportSpecifier::Default(local),
                "ImportNamespaceSpecifier" => ImportSpecifier::Namespace(local),
                _ => ImportSpecifier::Named(local),
            })
        })
        .collect();

    Some(Syntax::Import {
        source,
        specifiers,
        span: span(fields),
    })
}

fn convert_pattern(value: Option<&Value>) -> Pattern {
    let Some((kind, fields)) = value.and_then(node_fields) else {
        return Pattern::Unsupported("missing".to_owned());
    };

    match kind {
        "Identifier" => string(fields, "name")
            .map(Pattern::Identifier)
            .unwrap_or_else(|| Pattern::Unsupported(kind.to_owned())),
        "ObjectPattern" => Pattern::Object(
            list(fields, "properties")
                .filter_map(|property| {
                    let (kind, property) = node_fields(property)?;
                    let target = match kind {
                        "RestElement" => property.get("argument"),
                        _ => property.get("value"),
                    }?;
                    match node_fields(target)? {
                        ("AssignmentPattern", assignment) => {
                            identifier_name(assignment.get("left"))
                        }
                        _ => identifier_name(Some(target)),
                    }
                })
                .collect(),
        ),
        _ => Pattern::Unsupported(kind.to_owned()),
    }
}

fn convert_declarator(fields: &Fields) -> Declarator {
    Declarator {
        target: convert_pattern(fields.get("id")),
        init: node_field(fields, "init"),
        span: span(fields),
    }
}

fn convert_function(kind: FunctionKind, fields: &Fields) -> Option<Syntax> {
    let body = node_field(fields, "body")?;
    Some(Syntax::Function {
        kind,
        name: identifier_name(fields.get("id")),
        params: node_list(fields, "params"),
        body: Box::new(body),
        span: span(fields),
    })
}

fn convert_class(is_expression: bool, fields: &Fields) -> Syntax {
    let members = fields
        .get("body")
        .and_then(node_fields)
        .map(|(_, body)| {
            list(body, "body")
                .filter_map(|value| {
                    let (kind, member) = node_fields(value)?;
                    Some(ClassMember {
                        name: Some(property_key(member)),
                        is_method: kind == "MethodDefinition",
                        value: node_field(member, "value"),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Syntax::Class {
        name: identifier_name(fields.get("id")),
        is_expression,
        superclass: node_field(fields, "superClass").map(Box::new),
        members,
        span: span(fields),
    }
}

fn convert_property(value: &Value) -> Option<Property> {
    let (kind, fields) = node_fields(value)?;
    match kind {
        "SpreadElement" => Some(Property {
            key: "...".to_owned(),
            value: node_field(fields, "argument")?,
        }),
        _ => Some(Property {
            key: property_key(fields),
            value: node_field(fields, "value")?,
        }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn convert_expression(expression: Value) -> Syntax {
        let Some(Syntax::Expression { expression }) = convert(&json!({
            "type": "ExpressionStatement",
            "expression": expression,
        })) else {
            panic!("expression statement expected");
        };
        *expression
    }

    #[test]
    fn unknown_kinds_keep_children_in_property_order() {
        let converted = convert(&json!({
            "type": "IfStatement",
            "start": 0,
            "end": 10,
            "test": { "type": "Identifier", "name": "ready" },
            "consequent": { "type": "BlockStatement", "body": [] },
            "alternate": null
        }));

        let Some(Syntax::Other { kind, children }) = converted else {
            panic!("generic node expected");
        };
        assert_eq!(kind, "IfStatement");
        assert_eq!(
            children,
            vec![
                Syntax::Identifier {
                    name: "ready".to_owned()
                },
                Syntax::Block { body: Vec::new() },
            ]
        );
    }

    #[test]
    fn object_patterns_collect_local_names() {
        let pattern = convert_pattern(Some(&json!({
            "type": "ObjectPattern",
            "properties": [
                {
                    "type": "Property",
                    "key": { "type": "Identifier", "name": "readFile" },
                    "value": { "type": "Identifier", "name": "readFile" }
                },
                {
                    "type": "Property",
                    "key": { "type": "Identifier", "name": "join" },
                    "value": { "type": "Identifier", "name": "joinPath" }
                },
                {
                    "type": "Property",
                    "key": { "type": "Identifier", "name": "mode" },
                    "value": {
                        "type": "AssignmentPattern",
                        "left": { "type": "Identifier", "name": "mode" },
                        "right": { "type": "Literal", "value": 1, "raw": "1" }
                    }
                },
                {
                    "type": "RestElement",
                    "argument": { "type": "Identifier", "name": "rest" }
                }
            ]
        })));

        assert_eq!(
            pattern,
            Pattern::Object(vec![
                "readFile".to_owned(),
                "joinPath".to_owned(),
                "mode".to_owned(),
                "rest".to_owned(),
            ])
        );
    }

    #[test]
    fn array_holes_are_dropped() {
        let array = convert_expression(json!({
            "type": "ArrayExpression",
            "elements": [
                { "type": "Literal", "value": 1, "raw": "1" },
                null,
                { "type": "Literal", "value": 3, "raw": "3" }
            ]
        }));

        let Syntax::Array { elements } = array else {
            panic!("array expected");
        };
        assert_eq!(elements.len(), 2);
    }

    #[test]
    fn literal_without_raw_falls_back_to_json_value() {
        let literal = convert_expression(json!({ "type": "Literal", "value": "hi" }));
        assert_eq!(
            literal,
            Syntax::Literal {
                raw: "\"hi\"".to_owned()
            }
        );
    }

    #[test]
    fn class_members_distinguish_methods_from_fields() {
        let class = convert(&json!({
            "type": "ClassDeclaration",
            "id": { "type": "Identifier", "name": "Store" },
            "superClass": null,
            "body": {
                "type": "ClassBody",
                "body": [
                    {
                        "type": "MethodDefinition",
                        "key": { "type": "Identifier", "name": "load" },
                        "computed": false,
                        "value": {
                            "type": "FunctionExpression",
                            "id": null,
                            "params": [],
                            "body": { "type": "BlockStatement", "body": [] }
                        }
                    },
                    {
                        "type": "PropertyDefinition",
                        "key": { "type": "Identifier", "name": "size" },
                        "computed": false,
                        "value": { "type": "Literal", "value": 0, "raw": "0" }
                    }
                ]
            }
        }));

        let Some(Syntax::Class { name, members, .. }) = class else {
            panic!("class expected");
        };
        assert_eq!(name.as_deref(), Some("Store"));
        assert_eq!(members.len(), 2);
        assert!(members[0].is_method);
        assert_eq!(members[0].name.as_deref(), Some("load"));
        assert!(!members[1].is_method);
    }
}
