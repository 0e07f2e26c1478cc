use ironmeta::prelude::*;
use std::path::Path;

const LIBRARY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<descriptions version="2.0.0">
    <versions>
        <version name="1.0.0"/>
        <version name="1.5.0"/>
    </versions>
    <subtypes>
        <subtype name="genre">
            <case name="documentary" unused="true"/>
            <case name="drama"/>
            <case name="science_fiction"/>
        </subtype>
        <subtype name="permission">
            <option name="read"/>
            <option name="write"/>
        </subtype>
        <subtype name="rating">
            <property name="score" type="double"/>
            <property name="source" type="string" optional="true"/>
        </subtype>
    </subtypes>
    <entities>
        <entity name="user" queue="sync" persist="true">
            <property name="name" type="string"/>
            <property name="permissions" subtype="permission"/>
        </entity>
        <entity name="movie" persist="true" mutable="true" legacyPreviousName="film">
            <property name="title" type="string"/>
            <property name="genre" subtype="genre" default="drama"/>
            <property name="rating" subtype="rating" optional="true"/>
            <property name="synopsis" type="string" lazy="true"/>
            <property name="released_at" key="release_date" type="date"/>
            <property name="owner" relationship="user"/>
            <property name="cast" relationship="user" association="toMany"/>
        </entity>
        <entity name="settings" remote="false">
            <identifier type="void"/>
            <property name="autoplay" type="bool" default="true"/>
        </entity>
    </entities>
    <endpoints>
        <endpoint name="movies">
            <read entity="movie" baseKey="data" entityKey="movies" structure="array"/>
        </endpoint>
        <endpoint name="movie_save">
            <write entity="movie"/>
        </endpoint>
    </endpoints>
</descriptions>"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn generate(config: &GenerationConfig) -> Vec<GeneratedFile> {
    init_tracing();
    generate_from_xml(LIBRARY, config).expect("Failed to generate")
}

fn rendered(files: &[GeneratedFile], path: &str) -> String {
    files
        .iter()
        .find(|f| f.path == Path::new(path))
        .unwrap_or_else(|| panic!("{path} was not generated"))
        .render()
}

#[test]
fn test_generates_every_artifact() {
    let files = generate(&GenerationConfig::new().module_name("Library"));
    let paths: Vec<String> = files.iter().map(|f| f.path.display().to_string()).collect();
    for expected in [
        "Subtypes/SubtypeError.swift",
        "Subtypes/Genre.swift",
        "Subtypes/Permission.swift",
        "Subtypes/Rating.swift",
        "Entities/User.swift",
        "Entities/Movie.swift",
        "Entities/Settings.swift",
        "Identifiers/UserIdentifier.swift",
        "Identifiers/MovieIdentifier.swift",
        "Payloads/DefaultUserPayload.swift",
        "Payloads/DefaultMoviePayload.swift",
        "Persistence/User+CoreData.swift",
        "Persistence/Movie+CoreData.swift",
        "Endpoints/MoviesEndpointPayloads.swift",
        "Endpoints/MovieSaveEndpointPayloads.swift",
        "Support/EntityGraph.swift",
        "Support/CoreManagerContainer.swift",
        "Support/CoreManagerContainerClientQueueResponseHandler.swift",
        "Tests/Factories/UserFactory.swift",
        "Tests/Factories/MovieFactory.swift",
        "Tests/Factories/SettingsFactory.swift",
        "Tests/CoreDataMigrationTests.swift",
    ] {
        assert!(paths.contains(&expected.to_string()), "missing {expected}");
    }
    assert!(!paths.contains(&"Identifiers/SettingsIdentifier.swift".to_string()));
    assert!(!paths.contains(&"Payloads/DefaultSettingsPayload.swift".to_string()));
}

#[test]
fn test_cross_references_agree() {
    let files = generate(&GenerationConfig::default());

    let entity = rendered(&files, "Entities/Movie.swift");
    assert!(entity.contains("public let owner: UserIdentifier"));
    assert!(entity.contains("public let cast: AnySequence<UserIdentifier>"));
    assert!(entity.contains("public let synopsis: Lazy<String>"));

    let identifier = rendered(&files, "Identifiers/UserIdentifier.swift");
    assert!(identifier.contains("public final class UserIdentifier"));

    let payload = rendered(&files, "Payloads/DefaultMoviePayload.swift");
    assert!(payload.contains("public struct DefaultMoviePayload: Decodable {"));
    assert!(payload.contains("case releasedAt = \"release_date\""));

    let endpoint = rendered(&files, "Endpoints/MoviesEndpointPayloads.swift");
    assert!(endpoint.contains("public let entities: AnySequence<DefaultMoviePayload>"));

    let handler = rendered(
        &files,
        "Support/CoreManagerContainerClientQueueResponseHandler.swift",
    );
    assert!(handler.contains("MovieSaveEndpointWritePayload.self"));
    assert!(handler.contains("container.movieManager.setAndUpdateIdentifierInLocalStores"));

    let container = rendered(&files, "Support/CoreManagerContainer.swift");
    assert!(container.contains("public let movieManager: CoreManager<Movie>"));
    assert!(container.contains("syncClientQueue.register(responseHandler)"));
}

#[test]
fn test_subtypes() {
    let files = generate(&GenerationConfig::default());
    let genre = rendered(&files, "Subtypes/Genre.swift");
    assert!(genre.contains("case drama"));
    assert!(!genre.contains("case documentary\n"));
    assert!(genre.contains("throw SubtypeError.unusedCase(\"genre\", rawValue)"));

    let permission = rendered(&files, "Subtypes/Permission.swift");
    assert!(permission.contains("public static let write = Permission(rawValue: 1 << 1)"));
}

#[test]
fn test_concurrency_style_changes_handler_shape() {
    let structured = generate(&GenerationConfig::default());
    let futures = generate(&GenerationConfig::new().concurrency(ConcurrencyStyle::Futures));
    let path = "Support/CoreManagerContainerClientQueueResponseHandler.swift";
    assert!(rendered(&structured, path).contains("withTaskGroup"));
    assert!(rendered(&futures, path).contains("DispatchGroup()"));
}

#[test]
fn test_migration_tests_follow_history() {
    let files = generate(&GenerationConfig::new().module_name("Library"));
    let tests = rendered(&files, "Tests/CoreDataMigrationTests.swift");
    assert!(tests.contains("test_migration_from_1_0_0_should_succeed"));
    assert!(tests.contains("test_migration_from_1_5_0_should_succeed"));
    assert!(tests.contains("try assertCanRead(Movie.self, from: coreDataManager, legacyName: \"film\")"));
}

#[test]
fn test_rendering_is_deterministic() {
    let first: Vec<String> = generate(&GenerationConfig::default())
        .iter()
        .map(GeneratedFile::render)
        .collect();
    let second: Vec<String> = generate(&GenerationConfig::default())
        .iter()
        .map(GeneratedFile::render)
        .collect();
    assert_eq!(first, second);
}

#[test]
fn test_write_generated_tree() {
    let files = generate(&GenerationConfig::default());
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    write_generated(dir.path(), &files).expect("Failed to write");
    for file in &files {
        let written = std::fs::read_to_string(dir.path().join(&file.path)).expect("file written");
        assert_eq!(written, file.render());
    }
}

#[test]
fn test_unknown_relationship_is_reported() {
    init_tracing();
    let xml = LIBRARY.replace(r#"relationship="user" association="toMany""#, r#"relationship="actor" association="toMany""#);
    let err = generate_from_xml(&xml, &GenerationConfig::default()).expect_err("actor is missing");
    let message = err.to_string();
    assert!(message.contains("actor"));
    assert!(message.contains("movie.cast"));
}
