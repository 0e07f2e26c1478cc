//! Core manager container generation.
//!
//! The container owns one client queue per distinct queue name, one core
//! manager per entity, and registers the response handler once per queue.

use ironmeta_core::{
    AccessLevel, Assignment, File, Function, FunctionParameter, Node, Property, Reference, Tuple,
    Type, TypeIdentifier, TypeKind, Variable,
};
use ironmeta_schema::naming::camel_case;
use ironmeta_schema::Descriptions;

use super::response_handler::{RESPONSE_HANDLER_TYPE, ResponseHandlerGenerator};
use super::source_file;
use super::types::{entity_type, variable_name};
use crate::config::{GenerationConfig, SignalStyle};
use crate::error::CodegenError;

/// Name of the generated container type.
pub const CONTAINER_TYPE: &str = "CoreManagerContainer";

/// Generator for the core manager container.
pub struct ContainerGenerator<'a> {
    descriptions: &'a Descriptions,
    config: &'a GenerationConfig,
}

impl<'a> ContainerGenerator<'a> {
    /// Creates a new container generator.
    #[must_use]
    pub fn new(descriptions: &'a Descriptions, config: &'a GenerationConfig) -> Self {
        Self {
            descriptions,
            config,
        }
    }

    /// Returns the distinct queue names, in order of first use.
    #[must_use]
    pub fn queue_names(&self) -> Vec<&'a str> {
        let mut names: Vec<&str> = Vec::new();
        for entity in &self.descriptions.entities {
            let name = entity.queue_name();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Generates `CoreManagerContainer.swift`.
    ///
    /// # Errors
    /// Returns `CodegenError` if the response handler targets cannot be
    /// resolved.
    pub fn generate(&self) -> Result<File, CodegenError> {
        let handles_responses = !ResponseHandlerGenerator::new(self.descriptions, self.config)
            .merge_targets()?
            .is_empty();
        let queues = self.queue_names();
        tracing::debug!(
            "Container wires {} entities to {} client queues",
            self.descriptions.entities.len(),
            queues.len()
        );

        let mut container = Type::new(TypeIdentifier::named(CONTAINER_TYPE), TypeKind::FINAL_CLASS)
            .with_access_level(AccessLevel::Public);
        let mut init = Function::init()
            .with_access_level(AccessLevel::Public)
            .adding_parameter(FunctionParameter::new("client", TypeIdentifier::named("APIClient")))
            .adding_parameter(FunctionParameter::new(
                "coreDataManager",
                TypeIdentifier::named("CoreDataManager"),
            ));

        for queue in &queues {
            let name = queue_variable(queue);
            container = container.adding_member(Property::new(
                Variable::new(name.clone()).with_type(TypeIdentifier::named("APIClientQueue")),
            )
            .with_access_level(AccessLevel::Private));
            init = init.adding_statement(Assignment::new(
                Reference::named(name),
                TypeIdentifier::named("APIClientQueue")
                    .reference()
                    .member("clientQueue")
                    .call(
                        Tuple::new()
                            .adding_named("for", Reference::string(*queue))
                            .adding_named("client", Reference::named("client")),
                    ),
            ));
        }
        container = container.adding_member(Node::EmptyLine);

        if handles_responses {
            container = container
                .adding_member(
                    Property::new(Variable::new("responseHandler"))
                        .with_access_level(AccessLevel::Private)
                        .with_value(TypeIdentifier::named(RESPONSE_HANDLER_TYPE).reference().call_empty()),
                )
                .adding_member(Node::EmptyLine);
        }

        for entity in &self.descriptions.entities {
            let ty = entity_type(&entity.name);
            let manager = format!("{}Manager", variable_name(&entity.name));
            container = container.adding_member(
                Property::new(Variable::new(manager.clone()).with_type(
                    TypeIdentifier::named("CoreManager").adding_generic_parameter(ty.clone()),
                ))
                .with_access_level(AccessLevel::Public),
            );
            init = init.adding_statement(Assignment::new(
                Reference::named(manager),
                TypeIdentifier::named("CoreManager").reference().call(Tuple::new().adding_named(
                    "stores",
                    ty.reference().member("stores").call(
                        Tuple::new()
                            .adding_named("with", Reference::named("client"))
                            .adding_named("clientQueue", Reference::named(queue_variable(entity.queue_name())))
                            .adding_named("coreDataManager", Reference::named("coreDataManager")),
                    ),
                )),
            ));
        }

        container = container
            .adding_member(Node::EmptyLine)
            .adding_member(self.subscriptions())
            .adding_member(Node::EmptyLine);

        if handles_responses {
            for queue in &queues {
                init = init.adding_statement(
                    Reference::named(queue_variable(queue))
                        .member("register")
                        .call(Tuple::new().adding_unnamed(Reference::named("responseHandler"))),
                );
            }
            init = init.adding_statement(Assignment::new(
                Reference::named("responseHandler").member("container"),
                Reference::self_ref(),
            ));
        }

        Ok(source_file(CONTAINER_TYPE)
            .adding_import(self.config.signals.module())
            .adding(container.adding_member(init)))
    }

    /// Storage keeping signal subscriptions alive for the container lifetime.
    fn subscriptions(&self) -> Property {
        match self.config.signals {
            SignalStyle::Combine => Property::new(Variable::new("cancellables").with_immutable(false))
                .with_access_level(AccessLevel::Private)
                .with_value(
                    TypeIdentifier::named("Set")
                        .adding_generic_parameter(TypeIdentifier::named("AnyCancellable"))
                        .reference()
                        .call_empty(),
                ),
            SignalStyle::ReactiveKit => Property::new(Variable::new("disposeBag"))
                .with_access_level(AccessLevel::Private)
                .with_value(TypeIdentifier::named("DisposeBag").reference().call_empty()),
        }
    }
}

fn queue_variable(queue: &str) -> String {
    format!("{}ClientQueue", camel_case(queue))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironmeta_core::render_file;
    use ironmeta_schema::parse_descriptions;

    const XML: &str = r#"<descriptions version="1.0.0">
        <entities>
            <entity name="item" mutable="true"/>
            <entity name="tag" queue="sync"/>
            <entity name="user" queue="sync"/>
            <entity name="comment"/>
        </entities>
        <endpoints>
            <endpoint name="items"><write entity="item"/></endpoint>
        </endpoints>
    </descriptions>"#;

    #[test]
    fn test_queues_are_registered_once() {
        let descriptions = parse_descriptions(XML).expect("Failed to parse");
        let config = GenerationConfig::default();
        let generator = ContainerGenerator::new(&descriptions, &config);
        assert_eq!(generator.queue_names(), vec!["main", "sync"]);

        let output = render_file(&generator.generate().expect("Failed to generate"));
        assert_eq!(output.matches(".register(responseHandler)").count(), 2);
        assert_eq!(output.matches(": CoreManager<").count(), 4);
        assert!(output.contains("mainClientQueue.register(responseHandler)"));
        assert!(output.contains("syncClientQueue.register(responseHandler)"));
        assert!(output.contains(
            "syncClientQueue = APIClientQueue.clientQueue(for: \"sync\", client: client)"
        ));
        assert!(output.contains("responseHandler.container = self"));
    }

    #[test]
    fn test_managers_use_entity_queue() {
        let descriptions = parse_descriptions(XML).expect("Failed to parse");
        let config = GenerationConfig::default();
        let output = render_file(
            &ContainerGenerator::new(&descriptions, &config)
                .generate()
                .expect("Failed to generate"),
        );
        assert!(output.contains("public let tagManager: CoreManager<Tag>"));
        assert!(output.contains(
            "tagManager = CoreManager(stores: Tag.stores(with: client, clientQueue: syncClientQueue, coreDataManager: coreDataManager))"
        ));
    }

    #[test]
    fn test_signal_style() {
        let descriptions = parse_descriptions(XML).expect("Failed to parse");
        let config = GenerationConfig::default();
        let output = render_file(
            &ContainerGenerator::new(&descriptions, &config)
                .generate()
                .expect("Failed to generate"),
        );
        assert!(output.contains("import Combine"));
        assert!(output.contains("private var cancellables = Set<AnyCancellable>()"));

        let config = GenerationConfig::new().signals(SignalStyle::ReactiveKit);
        let output = render_file(
            &ContainerGenerator::new(&descriptions, &config)
                .generate()
                .expect("Failed to generate"),
        );
        assert!(output.contains("import ReactiveKit"));
        assert!(output.contains("private let disposeBag = DisposeBag()"));
    }

    #[test]
    fn test_no_handler_without_mutable_entities() {
        let descriptions = parse_descriptions(
            r#"<descriptions version="1.0.0"><entities><entity name="item"/></entities></descriptions>"#,
        )
        .expect("Failed to parse");
        let config = GenerationConfig::default();
        let output = render_file(
            &ContainerGenerator::new(&descriptions, &config)
                .generate()
                .expect("Failed to generate"),
        );
        assert!(!output.contains("responseHandler"));
    }
}
