//! Client queue response handler generation.
//!
//! For every mutable remote entity the handler merges server-assigned
//! identifiers back into the locally created objects once a write succeeds.
//! Each merge fans out over all written objects:
//! 1. the local identifier takes the remote value
//! 2. the client queue rewrites pending requests referring to it
//! 3. the remote object is persisted
//!
//! A decode failure, an aborted request or a failed request rolls back every
//! written object, whether or not some were already merged. The fan-out is
//! joined before the handler returns, either with a task group or with a
//! `DispatchGroup` notifying a completion callback.

use ironmeta_core::{
    AccessLevel, Assignment, Block, Catch, Comment, Condition, DoCatch, File, Function, FunctionParameter,
    Guard, Node, Property, Reference, Switch, SwitchCase, SwitchPattern, Tuple, Type,
    TypeIdentifier, TypeKind, Variable,
};
use ironmeta_schema::naming::pascal_case;
use ironmeta_schema::{Descriptions, EndpointPayload, Entity, PayloadStructure};

use super::container::CONTAINER_TYPE;
use super::endpoint::{PayloadSide, endpoint_payload_type};
use super::source_file;
use super::types::{entity_type, identifier_type, variable_name};
use crate::config::{ConcurrencyStyle, GenerationConfig};
use crate::error::CodegenError;

/// Name of the generated response handler type.
pub const RESPONSE_HANDLER_TYPE: &str = "CoreManagerContainerClientQueueResponseHandler";

/// Generator for the client queue response handler.
pub struct ResponseHandlerGenerator<'a> {
    descriptions: &'a Descriptions,
    config: &'a GenerationConfig,
}

impl<'a> ResponseHandlerGenerator<'a> {
    /// Creates a new response handler generator.
    #[must_use]
    pub fn new(descriptions: &'a Descriptions, config: &'a GenerationConfig) -> Self {
        Self {
            descriptions,
            config,
        }
    }

    /// Returns each entity needing identifier reconciliation with the first
    /// endpoint writing it, in declared order.
    ///
    /// # Errors
    /// Returns `CodegenError::MissingWritePayload` if a mutable remote entity
    /// is written by no endpoint.
    pub fn merge_targets(&self) -> Result<Vec<(&'a Entity, &'a EndpointPayload)>, CodegenError> {
        let descriptions = self.descriptions;
        descriptions
            .entities
            .iter()
            .filter(|entity| entity.mutable && entity.remote && !entity.has_void_identifier())
            .map(|entity| {
                descriptions
                    .endpoints_writing(&entity.name)
                    .next()
                    .map(|endpoint| (entity, endpoint))
                    .ok_or_else(|| CodegenError::MissingWritePayload {
                        entity: entity.name.clone(),
                    })
            })
            .collect()
    }

    /// Generates the handler file, or `None` when nothing needs merging.
    ///
    /// # Errors
    /// Returns `CodegenError::MissingWritePayload` if a mutable remote entity
    /// is written by no endpoint.
    pub fn generate(&self) -> Result<Option<File>, CodegenError> {
        let targets = self.merge_targets()?;
        if targets.is_empty() {
            return Ok(None);
        }

        let mut handler = Type::new(TypeIdentifier::named(RESPONSE_HANDLER_TYPE), TypeKind::FINAL_CLASS)
            .adding_inherited_type(TypeIdentifier::named("APIClientQueueResponseHandler"))
            .adding_member(Node::EmptyLine)
            .adding_member(
                Property::new(
                    Variable::new("container")
                        .with_type(TypeIdentifier::named(CONTAINER_TYPE).optional())
                        .with_weak(true),
                ),
            )
            .adding_member(Node::EmptyLine)
            .adding_member(
                Property::new(Variable::new("decoder"))
                    .with_access_level(AccessLevel::Private)
                    .with_value(TypeIdentifier::named("JSONDecoder").reference().call_empty()),
            )
            .adding_member(Node::EmptyLine)
            .adding_member(self.dispatch(&targets))
            .adding_member(Node::EmptyLine);

        for (entity, endpoint) in &targets {
            tracing::debug!(
                "Merging '{}' identifiers from endpoint '{}'",
                entity.name,
                endpoint.name
            );
            handler = handler
                .adding_member(Comment::mark(pascal_case(&entity.name)))
                .adding_member(Node::EmptyLine)
                .adding_member(self.merge(entity, endpoint))
                .adding_member(Node::EmptyLine)
                .adding_member(self.rollback(entity))
                .adding_member(Node::EmptyLine);
        }

        Ok(Some(source_file(RESPONSE_HANDLER_TYPE).adding(handler)))
    }

    fn is_structured(&self) -> bool {
        self.config.concurrency == ConcurrencyStyle::Structured
    }

    /// Adds the completion parameter in futures style, `async` otherwise.
    fn asynchronous(&self, function: Function) -> Function {
        if self.is_structured() {
            function.with_async(true)
        } else {
            function.adding_parameter(
                FunctionParameter::new("completion", completion_type()).with_escaping(true),
            )
        }
    }

    /// Calls an asynchronous function in the configured style.
    fn invoke(&self, callee: Reference, arguments: Tuple) -> Reference {
        if self.is_structured() {
            Reference::await_expr(callee.call(arguments))
        } else {
            callee.call(arguments.adding_named("completion", Reference::named("completion")))
        }
    }

    /// `clientQueue(_:didReceiveResponse:for:)`, routing a response to the
    /// merge function of the entity type it was issued for.
    fn dispatch(&self, targets: &[(&Entity, &EndpointPayload)]) -> Function {
        let mut switch = Switch::new(Reference::named("request").member("entityTypeUID"));
        for (entity, endpoint) in targets {
            let arguments = Tuple::new()
                .adding_unnamed(Reference::named("result"))
                .adding_named(
                    "localEntities",
                    Reference::named("request").member("localEntities").call(
                        Tuple::new().adding_named("of", entity_type(&entity.name).metatype().reference()),
                    ),
                )
                .adding_named("clientQueue", Reference::named("clientQueue"));
            switch = switch.adding_case(
                SwitchCase::new(SwitchPattern::Value(
                    identifier_type(entity).reference().member("entityTypeUID"),
                ))
                .adding_statement(self.invoke(Reference::named(merge_name(entity, endpoint)), arguments)),
            );
        }
        let fallback = if self.is_structured() {
            SwitchCase::default_case()
        } else {
            SwitchCase::default_case().adding_statement(Reference::named("completion").call_empty())
        };

        self.asynchronous(
            Function::named("clientQueue")
                .adding_parameter(
                    FunctionParameter::new("clientQueue", TypeIdentifier::named("APIClientQueuing"))
                        .with_alias("_"),
                )
                .adding_parameter(
                    FunctionParameter::new("result", result_type()).with_alias("didReceiveResponse"),
                )
                .adding_parameter(
                    FunctionParameter::new("request", TypeIdentifier::named("APIClientQueueRequest"))
                        .with_alias("for"),
                ),
        )
        .adding_statement(switch.adding_case(fallback))
    }

    fn merge(&self, entity: &Entity, endpoint: &EndpointPayload) -> Function {
        let ty = entity_type(&entity.name);
        let manager = Reference::named("container").member(format!("{}Manager", variable_name(&entity.name)));
        let rollback = self.invoke(
            Reference::named(rollback_name(entity)),
            Tuple::new()
                .adding_unnamed(Reference::named("localEntities"))
                .adding_named("container", Reference::named("container")),
        );

        let payload = Reference::try_expr(
            Reference::named("decoder").member("decode").call(
                Tuple::new()
                    .adding_unnamed(
                        endpoint_payload_type(&endpoint.name, PayloadSide::Write)
                            .metatype()
                            .reference(),
                    )
                    .adding_named("from", Reference::named("response").member("data")),
            ),
        );
        let single = endpoint
            .write_payload
            .as_ref()
            .is_none_or(|payload| payload.entity.structure == PayloadStructure::Single);
        let remote_entities = if single {
            Reference::array([ty.reference().call(
                Tuple::new().adding_named("payload", Reference::named("payload").member("entity")),
            )])
        } else {
            Reference::named("payload").member("entities").member("map").call_block(
                Block::expression(
                    ty.reference()
                        .call(Tuple::new().adding_named("payload", Reference::named("$0"))),
                ),
            )
        };

        let local = Reference::named("localEntity");
        let remote = Reference::named("remoteEntity");
        let update = local
            .clone()
            .member("identifier")
            .member("update")
            .call(Tuple::new().adding_named("with", remote.clone().member("identifier")));
        let requeue = Reference::named("clientQueue")
            .member("merge")
            .call(Tuple::new().adding_named("with", local.member("identifier")));
        let persist = manager
            .member("setAndUpdateIdentifierInLocalStores")
            .call(Tuple::new().adding_unnamed(remote));

        let pairs = Reference::named("zip").call(
            Tuple::new()
                .adding_unnamed(Reference::named("localEntities"))
                .adding_unnamed(Reference::named("remoteEntities")),
        );
        let fan_out = self.fan_out(
            pairs,
            &["localEntity", "remoteEntity"],
            vec![update.into()],
            requeue,
            persist,
        );

        let log = Reference::named("Logger").member("log").call(
            Tuple::new()
                .adding_unnamed(Reference::dot("error"))
                .adding_unnamed(Reference::string(format!(
                    "{RESPONSE_HANDLER_TYPE}: Could not decode {} write payload",
                    pascal_case(&entity.name)
                )))
                .adding_named("error", Reference::named("error")),
        );

        let success = DoCatch::new()
            .adding_statement(Property::new(Variable::new("payload")).with_value(payload))
            .adding_statement(Property::new(Variable::new("remoteEntities")).with_value(remote_entities))
            .adding_statements(fan_out)
            .adding_catch(Catch::new().adding_statement(log).adding_statement(rollback.clone()));

        let switch = Switch::new(Reference::named("result"))
            .adding_case(
                SwitchCase::new(SwitchPattern::TagWithBindings(
                    "success".to_string(),
                    vec!["response".to_string()],
                ))
                .adding_statement(success),
            )
            .adding_case(SwitchCase::tag("aborted").adding_statement(rollback.clone()))
            .adding_case(SwitchCase::tag("failure").adding_statement(rollback));

        self.asynchronous(
            Function::named(merge_name(entity, endpoint))
                .with_access_level(AccessLevel::Private)
                .adding_parameter(FunctionParameter::new("result", result_type()).with_alias("_"))
                .adding_parameter(FunctionParameter::new("localEntities", ty.array()))
                .adding_parameter(FunctionParameter::new(
                    "clientQueue",
                    TypeIdentifier::named("APIClientQueuing"),
                )),
        )
        .adding_statement(self.container_guard())
        .adding_statement(switch)
    }

    fn rollback(&self, entity: &Entity) -> Function {
        let manager = Reference::named("container").member(format!("{}Manager", variable_name(&entity.name)));
        let remove = manager
            .member("removeFromLocalStores")
            .call(Tuple::new().adding_unnamed(Reference::named("localEntity").member("identifier")));
        let fan_out = self.fan_out_single(Reference::named("localEntities"), remove);

        self.asynchronous(
            Function::named(rollback_name(entity))
                .with_access_level(AccessLevel::Private)
                .adding_parameter(
                    FunctionParameter::new("localEntities", entity_type(&entity.name).array())
                        .with_alias("_"),
                )
                .adding_parameter(FunctionParameter::new(
                    "container",
                    TypeIdentifier::named(CONTAINER_TYPE),
                )),
        )
        .adding_statements(fan_out)
    }

    /// `guard let container = container else { return }`, completing first in
    /// futures style.
    fn container_guard(&self) -> Guard {
        let guard = Guard::new(Condition::binding("container", Reference::named("container")));
        if self.is_structured() {
            guard.adding_else_statement(Node::Return(None))
        } else {
            guard
                .adding_else_statement(Reference::named("completion").call_empty())
                .adding_else_statement(Node::Return(None))
        }
    }

    /// Runs `prelude`, `notify` and `store` for every element of `sequence`
    /// and joins all of them.
    fn fan_out(
        &self,
        sequence: Reference,
        parameters: &[&str],
        prelude: Vec<Node>,
        notify: Reference,
        store: Reference,
    ) -> Vec<Node> {
        let mut element = Block::new();
        for parameter in parameters {
            element = element.adding_parameter(*parameter);
        }
        if self.is_structured() {
            let task = Block::new()
                .adding_statements(prelude)
                .adding_statement(Reference::await_expr(notify))
                .adding_statement(discarded(Reference::try_optional(Reference::await_expr(store))));
            vec![Reference::await_expr(task_group(sequence, element, task)).into()]
        } else {
            let element = element
                .adding_statement(Reference::named("group").member("enter").call_empty())
                .adding_statements(prelude)
                .adding_statement(notify)
                .adding_statement(leave_on_complete(store));
            dispatch_group(sequence, element)
        }
    }

    /// Runs `operation` for every element of `sequence`, bound as
    /// `localEntity`, and joins all of them.
    fn fan_out_single(&self, sequence: Reference, operation: Reference) -> Vec<Node> {
        let element = Block::new().adding_parameter("localEntity");
        if self.is_structured() {
            let task = Block::new()
                .adding_statement(discarded(Reference::try_optional(Reference::await_expr(operation))));
            vec![Reference::await_expr(task_group(sequence, element, task)).into()]
        } else {
            let element = element
                .adding_statement(Reference::named("group").member("enter").call_empty())
                .adding_statement(leave_on_complete(operation));
            dispatch_group(sequence, element)
        }
    }
}

/// `withTaskGroup(of: Void.self) { group in sequence.forEach { ... group.addTask { task } } }`
fn task_group(sequence: Reference, element: Block, task: Block) -> Reference {
    let element = element.adding_statement(
        Reference::named("group")
            .member("addTask")
            .call_block(task),
    );
    Reference::named("withTaskGroup")
        .call(
            Tuple::new()
                .adding_named("of", TypeIdentifier::void().metatype().reference())
                .adding_unnamed(Reference::block(
                    Block::new()
                        .adding_parameter("group")
                        .adding_statement(sequence.member("forEach").call_block(element)),
                )),
        )
}

/// `let group = DispatchGroup()`, the loop, then `group.notify(queue: .main, execute: completion)`.
fn dispatch_group(sequence: Reference, element: Block) -> Vec<Node> {
    vec![
        Property::new(Variable::new("group"))
            .with_value(TypeIdentifier::named("DispatchGroup").reference().call_empty())
            .into(),
        sequence.member("forEach").call_block(element).into(),
        Reference::named("group")
            .member("notify")
            .call(
                Tuple::new()
                    .adding_named("queue", Reference::dot("main"))
                    .adding_named("execute", Reference::named("completion")),
            )
            .into(),
    ]
}

/// `operation.onComplete { _ in group.leave() }`
fn leave_on_complete(operation: Reference) -> Reference {
    operation.member("onComplete").call_block(
        Block::new()
            .adding_parameter("_")
            .adding_statement(Reference::named("group").member("leave").call_empty()),
    )
}

/// `_ = value`
fn discarded(value: Reference) -> Assignment {
    Assignment::new(Reference::named("_"), value)
}

fn merge_name(entity: &Entity, endpoint: &EndpointPayload) -> String {
    format!(
        "merge{}{}Update",
        pascal_case(&entity.name),
        pascal_case(&endpoint.name)
    )
}

fn rollback_name(entity: &Entity) -> String {
    format!("rollback{}", pascal_case(&entity.name))
}

fn result_type() -> TypeIdentifier {
    TypeIdentifier::named("APIClientQueueResult")
        .adding_generic_parameter(TypeIdentifier::data())
        .adding_generic_parameter(TypeIdentifier::named("APIError"))
}

fn completion_type() -> TypeIdentifier {
    TypeIdentifier::named("() -> Void")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironmeta_core::render_file;
    use ironmeta_schema::parse_descriptions;

    const XML: &str = r#"<descriptions version="1.0.0">
        <entities>
            <entity name="item" mutable="true"/>
            <entity name="tag"/>
        </entities>
        <endpoints>
            <endpoint name="items"><read entity="item" structure="array"/></endpoint>
            <endpoint name="item_save"><write entity="item"/></endpoint>
            <endpoint name="item_bulk_save"><write entity="item" structure="array"/></endpoint>
        </endpoints>
    </descriptions>"#;

    fn render(config: &GenerationConfig) -> String {
        let descriptions = parse_descriptions(XML).expect("Failed to parse");
        let file = ResponseHandlerGenerator::new(&descriptions, config)
            .generate()
            .expect("Failed to generate")
            .expect("handler is needed");
        render_file(&file)
    }

    #[test]
    fn test_first_writing_endpoint_is_used() {
        let descriptions = parse_descriptions(XML).expect("Failed to parse");
        let config = GenerationConfig::default();
        let targets = ResponseHandlerGenerator::new(&descriptions, &config)
            .merge_targets()
            .expect("Failed to resolve");
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].0.name, "item");
        assert_eq!(targets[0].1.name, "item_save");
    }

    #[test]
    fn test_structured_merge() {
        let output = render(&GenerationConfig::default());
        assert!(output.contains(
            "private func mergeItemItemSaveUpdate(_ result: APIClientQueueResult<Data, APIError>, localEntities: [Item], clientQueue: APIClientQueuing) async {"
        ));
        assert!(output.contains("guard let container = container else { return }"));
        assert!(output.contains("case .success(let response):"));
        assert!(output.contains(
            "let payload = try decoder.decode(ItemSaveEndpointWritePayload.self, from: response.data)"
        ));
        assert!(output.contains("let remoteEntities = [Item(payload: payload.entity)]"));
        assert!(output.contains("await withTaskGroup(of: Void.self) { group in"));
        assert!(output.contains("zip(localEntities, remoteEntities).forEach { localEntity, remoteEntity in"));
        assert!(output.contains("localEntity.identifier.update(with: remoteEntity.identifier)"));
        assert!(output.contains("await clientQueue.merge(with: localEntity.identifier)"));
        assert!(output.contains(
            "_ = try? await container.itemManager.setAndUpdateIdentifierInLocalStores(remoteEntity)"
        ));
    }

    #[test]
    fn test_every_failure_path_rolls_back() {
        let output = render(&GenerationConfig::default());
        assert_eq!(
            output
                .matches("await rollbackItem(localEntities, container: container)")
                .count(),
            3
        );
        assert!(output.contains("case .aborted:"));
        assert!(output.contains("case .failure:"));
        assert!(output.contains(
            "private func rollbackItem(_ localEntities: [Item], container: CoreManagerContainer) async {"
        ));
        assert!(output.contains(
            "_ = try? await container.itemManager.removeFromLocalStores(localEntity.identifier)"
        ));
    }

    #[test]
    fn test_futures_merge() {
        let config = GenerationConfig::new().concurrency(ConcurrencyStyle::Futures);
        let output = render(&config);
        assert!(!output.contains("async"));
        assert!(output.contains("completion: @escaping () -> Void) {"));
        assert!(output.contains("let group = DispatchGroup()"));
        assert!(output.contains("group.enter()"));
        assert!(output.contains(
            "container.itemManager.setAndUpdateIdentifierInLocalStores(remoteEntity).onComplete { _ in group.leave() }"
        ));
        assert!(output.contains("group.notify(queue: .main, execute: completion)"));
        assert_eq!(
            output
                .matches("rollbackItem(localEntities, container: container, completion: completion)")
                .count(),
            3
        );
    }

    #[test]
    fn test_dispatch_routes_by_entity_type() {
        let output = render(&GenerationConfig::default());
        assert!(output.contains("weak var container: CoreManagerContainer?"));
        assert!(output.contains("case ItemIdentifier.entityTypeUID:"));
        assert!(output.contains(
            "await mergeItemItemSaveUpdate(result, localEntities: request.localEntities(of: Item.self), clientQueue: clientQueue)"
        ));
    }

    #[test]
    fn test_missing_write_payload() {
        let descriptions = parse_descriptions(
            r#"<descriptions version="1.0.0"><entities>
                <entity name="item" mutable="true"/>
            </entities></descriptions>"#,
        )
        .expect("Failed to parse");
        let config = GenerationConfig::default();
        let err = ResponseHandlerGenerator::new(&descriptions, &config)
            .generate()
            .expect_err("item is never written");
        assert!(matches!(err, CodegenError::MissingWritePayload { entity } if entity == "item"));
    }

    #[test]
    fn test_no_handler_for_read_only_entities() {
        let descriptions = parse_descriptions(
            r#"<descriptions version="1.0.0"><entities><entity name="item"/></entities></descriptions>"#,
        )
        .expect("Failed to parse");
        let config = GenerationConfig::default();
        let file = ResponseHandlerGenerator::new(&descriptions, &config)
            .generate()
            .expect("Failed to generate");
        assert!(file.is_none());
    }
}
