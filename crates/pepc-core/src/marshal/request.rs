//! Request-side mapping: Request, Subject, Resource, Action,
//! Environment, Attribute.

use crate::hessian::{List, Map, Value};
use crate::xacml::{Action, Attribute, Environment, Request, Resource, Subject};

use super::error::UnmarshalError;
use super::{
    entry_key, expect_list, expect_map, opt_string_field, opt_string_value, skip_unknown_key,
    string_items, string_list_value, CLASS_ACTION, CLASS_ATTRIBUTE, CLASS_ENVIRONMENT,
    CLASS_REQUEST, CLASS_RESOURCE, CLASS_SUBJECT, KEY_ACTION, KEY_ATTRIBUTES, KEY_CATEGORY,
    KEY_CONTENT, KEY_DATA_TYPE, KEY_ENVIRONMENT, KEY_ID, KEY_ISSUER, KEY_RESOURCES,
    KEY_SUBJECTS, KEY_VALUES,
};

pub(crate) fn request_to_value(request: &Request) -> Value {
    let mut map = Map::typed(CLASS_REQUEST);
    let mut subjects = List::new();
    for subject in &request.subjects {
        subjects.push(subject_to_value(subject));
    }
    map.push(Value::string(KEY_SUBJECTS), Value::List(subjects));
    let mut resources = List::new();
    for resource in &request.resources {
        resources.push(resource_to_value(resource));
    }
    map.push(Value::string(KEY_RESOURCES), Value::List(resources));
    map.push(
        Value::string(KEY_ACTION),
        request.action.as_ref().map_or(Value::Null, action_to_value),
    );
    map.push(
        Value::string(KEY_ENVIRONMENT),
        request
            .environment
            .as_ref()
            .map_or(Value::Null, environment_to_value),
    );
    Value::Map(map)
}

pub(crate) fn request_from_value(value: &Value) -> Result<Request, UnmarshalError> {
    let map = expect_map(value, CLASS_REQUEST, "Request")?;
    let mut request = Request::default();
    for (key, entry) in map.entries() {
        match entry_key(key, "Request")? {
            KEY_SUBJECTS => {
                for item in expect_list(entry, "Request", KEY_SUBJECTS)? {
                    request.subjects.push(subject_from_value(item)?);
                }
            },
            KEY_RESOURCES => {
                for item in expect_list(entry, "Request", KEY_RESOURCES)? {
                    request.resources.push(resource_from_value(item)?);
                }
            },
            KEY_ACTION => {
                if !entry.is_null() {
                    request.action = Some(action_from_value(entry)?);
                }
            },
            KEY_ENVIRONMENT => {
                if !entry.is_null() {
                    request.environment = Some(environment_from_value(entry)?);
                }
            },
            key => skip_unknown_key("Request", key),
        }
    }
    Ok(request)
}

fn subject_to_value(subject: &Subject) -> Value {
    let mut map = Map::typed(CLASS_SUBJECT);
    map.push(
        Value::string(KEY_CATEGORY),
        opt_string_value(subject.category.as_deref()),
    );
    map.push(
        Value::string(KEY_ATTRIBUTES),
        attributes_to_value(&subject.attributes),
    );
    Value::Map(map)
}

fn subject_from_value(value: &Value) -> Result<Subject, UnmarshalError> {
    let map = expect_map(value, CLASS_SUBJECT, "Subject")?;
    let mut subject = Subject::default();
    for (key, entry) in map.entries() {
        match entry_key(key, "Subject")? {
            KEY_CATEGORY => subject.category = opt_string_field(entry, "Subject", KEY_CATEGORY)?,
            KEY_ATTRIBUTES => {
                subject.attributes = attributes_from_value(entry, "Subject")?;
            },
            key => skip_unknown_key("Subject", key),
        }
    }
    Ok(subject)
}

fn resource_to_value(resource: &Resource) -> Value {
    let mut map = Map::typed(CLASS_RESOURCE);
    map.push(
        Value::string(KEY_CONTENT),
        opt_string_value(resource.content.as_deref()),
    );
    map.push(
        Value::string(KEY_ATTRIBUTES),
        attributes_to_value(&resource.attributes),
    );
    Value::Map(map)
}

fn resource_from_value(value: &Value) -> Result<Resource, UnmarshalError> {
    let map = expect_map(value, CLASS_RESOURCE, "Resource")?;
    let mut resource = Resource::default();
    for (key, entry) in map.entries() {
        match entry_key(key, "Resource")? {
            KEY_CONTENT => resource.content = opt_string_field(entry, "Resource", KEY_CONTENT)?,
            KEY_ATTRIBUTES => {
                resource.attributes = attributes_from_value(entry, "Resource")?;
            },
            key => skip_unknown_key("Resource", key),
        }
    }
    Ok(resource)
}

fn action_to_value(action: &Action) -> Value {
    let mut map = Map::typed(CLASS_ACTION);
    map.push(
        Value::string(KEY_ATTRIBUTES),
        attributes_to_value(&action.attributes),
    );
    Value::Map(map)
}

fn action_from_value(value: &Value) -> Result<Action, UnmarshalError> {
    let map = expect_map(value, CLASS_ACTION, "Action")?;
    let mut action = Action::default();
    for (key, entry) in map.entries() {
        match entry_key(key, "Action")? {
            KEY_ATTRIBUTES => {
                action.attributes = attributes_from_value(entry, "Action")?;
            },
            key => skip_unknown_key("Action", key),
        }
    }
    Ok(action)
}

fn environment_to_value(environment: &Environment) -> Value {
    let mut map = Map::typed(CLASS_ENVIRONMENT);
    map.push(
        Value::string(KEY_ATTRIBUTES),
        attributes_to_value(&environment.attributes),
    );
    Value::Map(map)
}

fn environment_from_value(value: &Value) -> Result<Environment, UnmarshalError> {
    let map = expect_map(value, CLASS_ENVIRONMENT, "Environment")?;
    let mut environment = Environment::default();
    for (key, entry) in map.entries() {
        match entry_key(key, "Environment")? {
            KEY_ATTRIBUTES => {
                environment.attributes = attributes_from_value(entry, "Environment")?;
            },
            key => skip_unknown_key("Environment", key),
        }
    }
    Ok(environment)
}

fn attributes_to_value(attributes: &[Attribute]) -> Value {
    let mut list = List::new();
    for attribute in attributes {
        list.push(attribute_to_value(attribute));
    }
    Value::List(list)
}

fn attributes_from_value(
    value: &Value,
    context: &'static str,
) -> Result<Vec<Attribute>, UnmarshalError> {
    let list = expect_list(value, context, KEY_ATTRIBUTES)?;
    let mut attributes = Vec::with_capacity(list.len());
    for item in list {
        attributes.push(attribute_from_value(item)?);
    }
    Ok(attributes)
}

fn attribute_to_value(attribute: &Attribute) -> Value {
    let mut map = Map::typed(CLASS_ATTRIBUTE);
    map.push(Value::string(KEY_ID), Value::string(attribute.id.clone()));
    map.push(
        Value::string(KEY_DATA_TYPE),
        opt_string_value(attribute.data_type.as_deref()),
    );
    map.push(
        Value::string(KEY_ISSUER),
        opt_string_value(attribute.issuer.as_deref()),
    );
    map.push(
        Value::string(KEY_VALUES),
        string_list_value(&attribute.values),
    );
    Value::Map(map)
}

fn attribute_from_value(value: &Value) -> Result<Attribute, UnmarshalError> {
    let map = expect_map(value, CLASS_ATTRIBUTE, "Attribute")?;
    let mut id: Option<String> = None;
    let mut attribute = Attribute::default();
    for (key, entry) in map.entries() {
        match entry_key(key, "Attribute")? {
            KEY_ID => id = opt_string_field(entry, "Attribute", KEY_ID)?,
            KEY_DATA_TYPE => {
                attribute.data_type = opt_string_field(entry, "Attribute", KEY_DATA_TYPE)?;
            },
            KEY_ISSUER => attribute.issuer = opt_string_field(entry, "Attribute", KEY_ISSUER)?,
            KEY_VALUES => attribute.values = string_items(entry, "Attribute", KEY_VALUES)?,
            key => skip_unknown_key("Attribute", key),
        }
    }
    attribute.id = id.ok_or(UnmarshalError::MissingRequired {
        class: "Attribute",
        field: KEY_ID,
    })?;
    Ok(attribute)
}

#[cfg(test)]
mod tests {
    use super::super::{marshal_request, unmarshal_request};
    use super::*;
    use crate::hessian::{deserialize, serialize};

    fn sample_request() -> Request {
        let mut subject = Subject::default();
        subject.attributes.push(
            Attribute::new("urn:oasis:names:tc:xacml:1.0:subject:subject-id")
                .data_type("urn:oasis:names:tc:xacml:1.0:data-type:x500Name")
                .value("CN=Alice,O=Example,C=CH"),
        );
        let mut resource = Resource::default();
        resource.attributes.push(
            Attribute::new("urn:oasis:names:tc:xacml:1.0:resource:resource-id")
                .value("urn:example:cluster"),
        );
        let mut action = Action::default();
        action.attributes.push(
            Attribute::new("urn:oasis:names:tc:xacml:1.0:action:action-id").value("submit"),
        );
        Request {
            subjects: vec![subject],
            resources: vec![resource],
            action: Some(action),
            environment: None,
        }
    }

    #[test]
    fn request_round_trips() {
        let request = sample_request();
        let bytes = marshal_request(&request).unwrap();
        assert_eq!(unmarshal_request(&bytes).unwrap(), request);
    }

    #[test]
    fn empty_request_round_trips() {
        let request = Request::default();
        let bytes = marshal_request(&request).unwrap();
        assert_eq!(unmarshal_request(&bytes).unwrap(), request);
    }

    #[test]
    fn marshal_is_deterministic() {
        let request = sample_request();
        assert_eq!(
            marshal_request(&request).unwrap(),
            marshal_request(&request).unwrap()
        );
    }

    #[test]
    fn wire_shape_has_fixed_key_order() {
        let bytes = marshal_request(&sample_request()).unwrap();
        let Value::Map(map) = deserialize(&bytes).unwrap() else {
            panic!("expected map");
        };
        assert_eq!(map.type_name(), Some(CLASS_REQUEST));
        let keys: Vec<_> = map
            .entries()
            .iter()
            .map(|(k, _)| k.as_str().unwrap())
            .collect();
        assert_eq!(keys, [KEY_SUBJECTS, KEY_RESOURCES, KEY_ACTION, KEY_ENVIRONMENT]);
    }

    #[test]
    fn absent_action_is_an_explicit_null() {
        let bytes = marshal_request(&Request::default()).unwrap();
        let Value::Map(map) = deserialize(&bytes).unwrap() else {
            panic!("expected map");
        };
        assert_eq!(map.get(KEY_ACTION), Some(&Value::Null));
        assert_eq!(map.get(KEY_ENVIRONMENT), Some(&Value::Null));
    }

    #[test]
    fn attribute_without_values_is_an_empty_list() {
        let mut subject = Subject::default();
        subject.attributes.push(Attribute::new("urn:example:empty"));
        let request = Request {
            subjects: vec![subject],
            ..Request::default()
        };
        let bytes = marshal_request(&request).unwrap();
        let Value::Map(map) = deserialize(&bytes).unwrap() else {
            panic!("expected map");
        };
        let Some(Value::List(subjects)) = map.get(KEY_SUBJECTS) else {
            panic!("expected subjects list");
        };
        let Value::Map(subject_map) = &subjects.elements()[0] else {
            panic!("expected subject map");
        };
        let Some(Value::List(attrs)) = subject_map.get(KEY_ATTRIBUTES) else {
            panic!("expected attribute list");
        };
        let Value::Map(attr_map) = &attrs.elements()[0] else {
            panic!("expected attribute map");
        };
        assert_eq!(
            attr_map.get(KEY_VALUES),
            Some(&Value::List(List::new())),
            "zero values must encode as an empty list, not null"
        );
        // And back out again.
        let decoded = unmarshal_request(&bytes).unwrap();
        assert!(decoded.subjects[0].attributes[0].values.is_empty());
    }

    #[test]
    fn empty_attribute_values_round_trip() {
        let mut subject = Subject::default();
        subject
            .attributes
            .push(Attribute::new("urn:example:empty").value(""));
        let request = Request {
            subjects: vec![subject],
            ..Request::default()
        };
        let bytes = marshal_request(&request).unwrap();
        assert_eq!(unmarshal_request(&bytes).unwrap(), request);
    }

    #[test]
    fn unknown_keys_are_skipped() {
        let mut map = Map::typed(CLASS_REQUEST);
        map.push(Value::string("futureField"), Value::string("x"));
        map.push(Value::string(KEY_SUBJECTS), Value::List(List::new()));
        map.push(Value::string(KEY_RESOURCES), Value::List(List::new()));
        map.push(Value::string(KEY_ACTION), Value::Null);
        map.push(Value::string(KEY_ENVIRONMENT), Value::Null);
        let bytes = serialize(&Value::Map(map)).unwrap();
        assert_eq!(unmarshal_request(&bytes).unwrap(), Request::default());
    }

    #[test]
    fn missing_keys_mean_absent_fields() {
        // A request map with no keys at all decodes to the empty request.
        let map = Map::typed(CLASS_REQUEST);
        let bytes = serialize(&Value::Map(map)).unwrap();
        assert_eq!(unmarshal_request(&bytes).unwrap(), Request::default());
    }

    #[test]
    fn wrong_class_name_is_rejected() {
        let map = Map::typed("org.glite.authz.pep.model.Widget");
        let bytes = serialize(&Value::Map(map)).unwrap();
        let err = unmarshal_request(&bytes).unwrap_err();
        assert!(matches!(err, UnmarshalError::ShapeMismatch { .. }));
    }

    #[test]
    fn attribute_missing_id_is_rejected() {
        let mut attr = Map::typed(CLASS_ATTRIBUTE);
        attr.push(Value::string(KEY_VALUES), Value::List(List::new()));
        let mut attrs = List::new();
        attrs.push(Value::Map(attr));
        let mut subject = Map::typed(CLASS_SUBJECT);
        subject.push(Value::string(KEY_ATTRIBUTES), Value::List(attrs));
        let mut subjects = List::new();
        subjects.push(Value::Map(subject));
        let mut request = Map::typed(CLASS_REQUEST);
        request.push(Value::string(KEY_SUBJECTS), Value::List(subjects));
        let bytes = serialize(&Value::Map(request)).unwrap();
        let err = unmarshal_request(&bytes).unwrap_err();
        assert_eq!(
            err,
            UnmarshalError::MissingRequired {
                class: "Attribute",
                field: "id"
            }
        );
    }

    #[test]
    fn attribute_null_id_is_rejected() {
        let mut attr = Map::typed(CLASS_ATTRIBUTE);
        attr.push(Value::string(KEY_ID), Value::Null);
        let mut attrs = List::new();
        attrs.push(Value::Map(attr));
        let mut action = Map::typed(CLASS_ACTION);
        action.push(Value::string(KEY_ATTRIBUTES), Value::List(attrs));
        let mut request = Map::typed(CLASS_REQUEST);
        request.push(Value::string(KEY_ACTION), Value::Map(action));
        let bytes = serialize(&Value::Map(request)).unwrap();
        let err = unmarshal_request(&bytes).unwrap_err();
        assert!(matches!(err, UnmarshalError::MissingRequired { .. }));
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;
        use crate::xacml::Environment;

        fn arb_attribute() -> impl Strategy<Value = Attribute> {
            (
                "[a-z][a-z:.-]{0,30}",
                proptest::option::of("[a-z][a-z:#/.-]{0,30}"),
                proptest::option::of("[a-z][a-z:.-]{0,20}"),
                proptest::collection::vec(".*", 0..4),
            )
                .prop_map(|(id, data_type, issuer, values)| Attribute {
                    id,
                    data_type,
                    issuer,
                    values,
                })
        }

        fn arb_subject() -> impl Strategy<Value = Subject> {
            (
                proptest::option::of("[a-z][a-z:.-]{0,30}"),
                proptest::collection::vec(arb_attribute(), 0..4),
            )
                .prop_map(|(category, attributes)| Subject {
                    category,
                    attributes,
                })
        }

        fn arb_resource() -> impl Strategy<Value = Resource> {
            (
                proptest::option::of(".*"),
                proptest::collection::vec(arb_attribute(), 0..4),
            )
                .prop_map(|(content, attributes)| Resource {
                    content,
                    attributes,
                })
        }

        fn arb_request() -> impl Strategy<Value = Request> {
            (
                proptest::collection::vec(arb_subject(), 0..3),
                proptest::collection::vec(arb_resource(), 0..3),
                proptest::option::of(
                    proptest::collection::vec(arb_attribute(), 0..4)
                        .prop_map(|attributes| Action { attributes }),
                ),
                proptest::option::of(
                    proptest::collection::vec(arb_attribute(), 0..4)
                        .prop_map(|attributes| Environment { attributes }),
                ),
            )
                .prop_map(|(subjects, resources, action, environment)| Request {
                    subjects,
                    resources,
                    action,
                    environment,
                })
        }

        proptest! {
            #[test]
            fn any_request_round_trips(request in arb_request()) {
                let bytes = marshal_request(&request).unwrap();
                prop_assert_eq!(unmarshal_request(&bytes).unwrap(), request);
            }

            #[test]
            fn marshalling_is_deterministic(request in arb_request()) {
                prop_assert_eq!(
                    marshal_request(&request).unwrap(),
                    marshal_request(&request).unwrap()
                );
            }
        }
    }

    #[test]
    fn subject_order_is_preserved() {
        let mut request = Request::default();
        for n in 0..5 {
            let mut subject = Subject::default();
            subject.category = Some(format!("urn:example:category:{n}"));
            request.subjects.push(subject);
        }
        let bytes = marshal_request(&request).unwrap();
        let decoded = unmarshal_request(&bytes).unwrap();
        for (n, subject) in decoded.subjects.iter().enumerate() {
            assert_eq!(
                subject.category.as_deref(),
                Some(format!("urn:example:category:{n}").as_str())
            );
        }
    }
}
