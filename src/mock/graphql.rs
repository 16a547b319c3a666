/*
 * Copyright 2026 Registry Mock Team
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! Schema-driven mocking.
//!
//! The spec's SDL is parsed into a dynamic executable schema in which every
//! field resolves to a generated value: built-in scalars get fixed values,
//! `Date` resolves to the instant the mock schema was built, enums resolve
//! to their first value and lists hold two items. Per-type overrides come
//! from `mock.scalar_mocks`.

use crate::config::MockProtocol;
use crate::error::{Error, Result};
use crate::mock::{MockEngine, MockRequest, MockResponse};
use crate::registry::{Contents, ResourceName};
use async_graphql::dynamic::{
    Enum, EnumItem, Field, FieldFuture, FieldValue, InputObject, InputValue, Interface,
    InterfaceField, Object, Scalar, Schema, TypeRef, Union,
};
use async_graphql::parser::parse_schema;
use async_graphql::parser::types::{
    BaseType, FieldDefinition, InputValueDefinition, Type, TypeDefinition, TypeKind,
    TypeSystemDefinition,
};
use async_graphql::{Name, Request, Value as GqlValue, Variables};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{debug, info};

const BUILTIN_SCALARS: &[&str] = &["String", "Int", "Float", "Boolean", "ID"];
const LIST_LENGTH: usize = 2;

/// Generated value for one field's type.
#[derive(Debug, Clone)]
enum Mock {
    Leaf(GqlValue),
    /// Fresh identifier per resolution.
    Id,
    /// Concrete object; abstract types carry the implementor to report.
    Object(Option<String>),
    List(Box<Mock>),
    Null,
}

impl Mock {
    fn field_value(&self) -> FieldValue<'static> {
        match self {
            Mock::Leaf(value) => FieldValue::value(value.clone()),
            Mock::Id => FieldValue::value(GqlValue::String(uuid::Uuid::new_v4().to_string())),
            Mock::Object(None) => FieldValue::owned_any(()),
            Mock::Object(Some(concrete)) => FieldValue::owned_any(()).with_type(concrete.clone()),
            Mock::List(item) => FieldValue::list((0..LIST_LENGTH).map(|_| item.field_value())),
            Mock::Null => FieldValue::NULL,
        }
    }
}

/// Parsed type system with extensions folded into their base definitions.
struct TypeSystem {
    types: Vec<TypeDefinition>,
    query: String,
    mutation: Option<String>,
}

impl TypeSystem {
    fn parse(sdl: &str) -> Result<Self> {
        let document = parse_schema(sdl).map_err(|e| Error::SchemaInvalid(e.to_string()))?;

        let mut types: Vec<TypeDefinition> = Vec::new();
        let mut query = None;
        let mut mutation = None;

        for definition in document.definitions {
            match definition {
                TypeSystemDefinition::Schema(schema) => {
                    let schema = schema.node;
                    if let Some(name) = schema.query {
                        query = Some(name.node.to_string());
                    }
                    if let Some(name) = schema.mutation {
                        mutation = Some(name.node.to_string());
                    }
                }
                TypeSystemDefinition::Type(definition) => {
                    let definition = definition.node;
                    match types.iter_mut().find(|t| t.name.node == definition.name.node) {
                        Some(existing) => merge(existing, definition.kind),
                        None => types.push(definition),
                    }
                }
                TypeSystemDefinition::Directive(_) => {}
            }
        }

        let declared = |name: &str| types.iter().any(|t| t.name.node.as_str() == name);
        let query = query.unwrap_or_else(|| "Query".to_string());
        if !declared(&query) {
            return Err(Error::SchemaInvalid(format!(
                "schema does not declare a {} type",
                query
            )));
        }
        let mutation = mutation.or_else(|| declared("Mutation").then(|| "Mutation".to_string()));

        Ok(Self {
            types,
            query,
            mutation,
        })
    }

    fn kind_of(&self, name: &str) -> Option<&TypeKind> {
        self.types
            .iter()
            .find(|t| t.name.node.as_str() == name)
            .map(|t| &t.kind)
    }

    /// First object type belonging to an interface or union.
    fn first_implementor(&self, name: &str) -> Option<String> {
        match self.kind_of(name)? {
            TypeKind::Union(union) => union.members.first().map(|m| m.node.to_string()),
            TypeKind::Interface(_) => self.types.iter().find_map(|t| match &t.kind {
                TypeKind::Object(object)
                    if object.implements.iter().any(|i| i.node.as_str() == name) =>
                {
                    Some(t.name.node.to_string())
                }
                _ => None,
            }),
            _ => None,
        }
    }
}

fn merge(existing: &mut TypeDefinition, extension: TypeKind) {
    match (&mut existing.kind, extension) {
        (TypeKind::Object(base), TypeKind::Object(ext)) => {
            base.implements.extend(ext.implements);
            base.fields.extend(ext.fields);
        }
        (TypeKind::Interface(base), TypeKind::Interface(ext)) => base.fields.extend(ext.fields),
        (TypeKind::InputObject(base), TypeKind::InputObject(ext)) => base.fields.extend(ext.fields),
        (TypeKind::Enum(base), TypeKind::Enum(ext)) => base.values.extend(ext.values),
        (TypeKind::Union(base), TypeKind::Union(ext)) => base.members.extend(ext.members),
        _ => {}
    }
}

fn number(value: f64) -> GqlValue {
    serde_json::Number::from_f64(value)
        .map(GqlValue::Number)
        .unwrap_or(GqlValue::Null)
}

fn type_ref(ty: &Type) -> TypeRef {
    let base = match &ty.base {
        BaseType::Named(name) => TypeRef::Named(name.to_string().into()),
        BaseType::List(item) => TypeRef::List(Box::new(type_ref(item))),
    };
    if ty.nullable {
        base
    } else {
        TypeRef::NonNull(Box::new(base))
    }
}

fn input_value(definition: &InputValueDefinition) -> InputValue {
    InputValue::new(definition.name.node.to_string(), type_ref(&definition.ty.node))
}

/// Builds executable mock schemas from SDL.
struct MockBuilder<'a> {
    types: &'a TypeSystem,
    overrides: HashMap<String, GqlValue>,
}

impl<'a> MockBuilder<'a> {
    fn new(types: &'a TypeSystem, scalar_mocks: &HashMap<String, Value>) -> Self {
        let mut overrides = HashMap::new();
        overrides.insert(
            "Date".to_string(),
            GqlValue::String(chrono::Utc::now().to_rfc3339()),
        );
        for (name, value) in scalar_mocks {
            match GqlValue::from_json(value.clone()) {
                Ok(value) => {
                    overrides.insert(name.clone(), value);
                }
                Err(e) => debug!(scalar = %name, error = %e, "Ignoring scalar mock override"),
            }
        }
        Self { types, overrides }
    }

    fn mock_for(&self, ty: &Type) -> Mock {
        match &ty.base {
            BaseType::List(item) => Mock::List(Box::new(self.mock_for(item))),
            BaseType::Named(name) => self.mock_named(name),
        }
    }

    fn mock_named(&self, name: &Name) -> Mock {
        if let Some(value) = self.overrides.get(name.as_str()) {
            return Mock::Leaf(value.clone());
        }
        match name.as_str() {
            "String" => return Mock::Leaf(GqlValue::String("Hello World".to_string())),
            "Int" => return Mock::Leaf(GqlValue::Number(42.into())),
            "Float" => return Mock::Leaf(number(4.2)),
            "Boolean" => return Mock::Leaf(GqlValue::Boolean(true)),
            "ID" => return Mock::Id,
            _ => {}
        }

        match self.types.kind_of(name.as_str()) {
            Some(TypeKind::Object(_)) => Mock::Object(None),
            Some(TypeKind::Interface(_)) | Some(TypeKind::Union(_)) => {
                match self.types.first_implementor(name.as_str()) {
                    Some(concrete) => Mock::Object(Some(concrete)),
                    None => Mock::Null,
                }
            }
            Some(TypeKind::Enum(values)) => values
                .values
                .first()
                .map(|v| Mock::Leaf(GqlValue::Enum(v.node.value.node.clone())))
                .unwrap_or(Mock::Null),
            Some(TypeKind::Scalar) => Mock::Leaf(GqlValue::String("Hello World".to_string())),
            Some(TypeKind::InputObject(_)) | None => Mock::Null,
        }
    }

    fn field(&self, definition: &FieldDefinition) -> Field {
        let mock = self.mock_for(&definition.ty.node);
        let mut field = Field::new(
            definition.name.node.to_string(),
            type_ref(&definition.ty.node),
            move |_| {
                let value = mock.field_value();
                FieldFuture::new(async move { Ok::<_, async_graphql::Error>(Some(value)) })
            },
        );
        for argument in &definition.arguments {
            field = field.argument(input_value(&argument.node));
        }
        field
    }

    fn build(&self) -> Result<Schema> {
        let mut builder = Schema::build(&self.types.query, self.types.mutation.as_deref(), None);

        for definition in &self.types.types {
            let name = definition.name.node.to_string();
            builder = match &definition.kind {
                TypeKind::Scalar if BUILTIN_SCALARS.contains(&name.as_str()) => builder,
                TypeKind::Scalar => builder.register(Scalar::new(name)),
                TypeKind::Object(object) => {
                    let mut ty = Object::new(name);
                    for interface in &object.implements {
                        ty = ty.implement(interface.node.to_string());
                    }
                    for field in &object.fields {
                        ty = ty.field(self.field(&field.node));
                    }
                    builder.register(ty)
                }
                TypeKind::Interface(interface) => {
                    let mut ty = Interface::new(name);
                    for field in &interface.fields {
                        let field = &field.node;
                        let mut iface_field = InterfaceField::new(
                            field.name.node.to_string(),
                            type_ref(&field.ty.node),
                        );
                        for argument in &field.arguments {
                            iface_field = iface_field.argument(input_value(&argument.node));
                        }
                        ty = ty.field(iface_field);
                    }
                    builder.register(ty)
                }
                TypeKind::Union(union) => {
                    let mut ty = Union::new(name);
                    for member in &union.members {
                        ty = ty.possible_type(member.node.to_string());
                    }
                    builder.register(ty)
                }
                TypeKind::Enum(values) => {
                    let mut ty = Enum::new(name);
                    for value in &values.values {
                        ty = ty.item(EnumItem::new(value.node.value.node.to_string()));
                    }
                    builder.register(ty)
                }
                TypeKind::InputObject(input) => {
                    let mut ty = InputObject::new(name);
                    for field in &input.fields {
                        ty = ty.field(input_value(&field.node));
                    }
                    builder.register(ty)
                }
            };
        }

        builder
            .finish()
            .map_err(|e| Error::SchemaInvalid(e.to_string()))
    }
}

/// GraphQL-over-HTTP request parameters.
#[derive(Debug, Deserialize)]
struct GraphQlParams {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    variables: Option<Value>,
    #[serde(default, rename = "operationName")]
    operation_name: Option<String>,
}

impl GraphQlParams {
    fn from_request(request: &MockRequest) -> Result<Self> {
        let is_graphql_body = request
            .content_type()
            .is_some_and(|ct| ct.starts_with("application/graphql"));

        if request.method.eq_ignore_ascii_case("POST") && !request.body.is_empty() {
            if is_graphql_body {
                return Ok(Self {
                    query: Some(String::from_utf8_lossy(&request.body).into_owned()),
                    variables: None,
                    operation_name: None,
                });
            }
            return serde_json::from_slice(&request.body)
                .map_err(|e| Error::SchemaExecution(vec![format!("Invalid request body: {}", e)]));
        }

        let mut params = Self {
            query: None,
            variables: None,
            operation_name: None,
        };
        for (key, value) in url::form_urlencoded::parse(request.query.as_bytes()) {
            match key.as_ref() {
                "query" => params.query = Some(value.into_owned()),
                "operationName" => params.operation_name = Some(value.into_owned()),
                "variables" => {
                    let variables = serde_json::from_str(&value).map_err(|e| {
                        Error::SchemaExecution(vec![format!("Invalid variables: {}", e)])
                    })?;
                    params.variables = Some(variables);
                }
                _ => {}
            }
        }
        Ok(params)
    }

    fn into_request(self) -> Result<Request> {
        let query = self
            .query
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| Error::SchemaExecution(vec!["Must provide query string".to_string()]))?;

        let mut request = Request::new(query);
        if let Some(variables) = self.variables.filter(|v| !v.is_null()) {
            request = request.variables(Variables::from_json(variables));
        }
        if let Some(operation_name) = self.operation_name {
            request = request.operation_name(operation_name);
        }
        Ok(request)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GraphQlMockEngine {
    scalar_mocks: HashMap<String, Value>,
}

impl GraphQlMockEngine {
    pub fn new(scalar_mocks: HashMap<String, Value>) -> Self {
        Self { scalar_mocks }
    }

    /// Parses SDL into a mock schema. Date values are fixed at this point.
    pub fn build_schema(&self, sdl: &str) -> Result<Schema> {
        let types = TypeSystem::parse(sdl)?;
        MockBuilder::new(&types, &self.scalar_mocks).build()
    }

    pub async fn execute(&self, sdl: &str, request: Request) -> Result<Value> {
        let schema = self.build_schema(sdl)?;
        let response = schema.execute(request).await;

        if !response.errors.is_empty() {
            return Err(Error::SchemaExecution(
                response.errors.into_iter().map(|e| e.message).collect(),
            ));
        }

        let data = response
            .data
            .into_json()
            .map_err(|e| Error::SchemaExecution(vec![e.to_string()]))?;
        Ok(json!({ "data": data }))
    }
}

#[async_trait]
impl MockEngine for GraphQlMockEngine {
    fn protocol(&self) -> MockProtocol {
        MockProtocol::Graphql
    }

    async fn respond(
        &self,
        spec_name: &ResourceName,
        spec: &Contents,
        request: &MockRequest,
    ) -> Result<MockResponse> {
        let sdl = std::str::from_utf8(&spec.data)
            .map_err(|_| Error::SchemaInvalid(format!("{} is not UTF-8 text", spec_name)))?;
        let graphql_request = GraphQlParams::from_request(request)?.into_request()?;

        let body = self.execute(sdl, graphql_request).await?;
        info!(spec = %spec_name, "Served GraphQL mock response");
        Ok(MockResponse::json(200, &body))
    }
}
