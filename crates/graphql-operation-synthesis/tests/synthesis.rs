use graphql_operation_synthesis::{
    build_operation, build_root_operations, OperationKind, Schema, SynthesisError, SynthesisOptions, TypeRef,
};
use indoc::indoc;
use pretty_assertions::assert_eq;

fn schema(sdl: &str) -> Schema {
    Schema::from_sdl(sdl).unwrap()
}

fn compact(schema: &Schema, kind: OperationKind, field: &str, options: &SynthesisOptions) -> String {
    build_operation(schema, kind, field, options)
        .unwrap()
        .root_field()
        .to_string()
}

const CHAT: &str = indoc! {r#"
    type Query {
      ping: Boolean
    }

    type Subscription {
      messageAdded(roomId: ID!): Message!
    }

    type Message {
      id: ID!
      text: String!
      author: User!
    }

    type User {
      id: ID!
      name: String!
      messages: [Message!]!
    }
"#};

#[test]
fn subscription_with_model_author() {
    let schema = schema(CHAT);
    let options = SynthesisOptions::default().with_models(["User"]);

    let document = build_operation(&schema, OperationKind::Subscription, "messageAdded", &options).unwrap();

    assert_eq!(document.kind(), OperationKind::Subscription);
    assert_eq!(document.operation_name(), "messageAdded_subscription");
    assert_eq!(document.variables().len(), 1);
    assert_eq!(document.variables()[0].name, "roomId");
    assert_eq!(
        document.variables()[0].ty,
        TypeRef::non_null(TypeRef::named("ID"))
    );

    insta::assert_snapshot!(document, @r###"
    subscription messageAdded_subscription($roomId: ID!) {
      messageAdded(roomId: $roomId) {
        id
        text
        author {
          id
        }
      }
    }
    "###);
}

#[test]
fn subscription_without_models_expands_author() {
    let schema = schema(CHAT);

    assert_eq!(
        compact(&schema, OperationKind::Subscription, "messageAdded", &SynthesisOptions::default()),
        "messageAdded(roomId: $roomId) { id text author { id name } }"
    );
}

#[test]
fn mutual_recursion_terminates() {
    let schema = schema(indoc! {r#"
        type Query {
          a: A
        }

        type A {
          id: ID!
          b: B
        }

        type B {
          id: ID!
          name: String
          a: A
        }
    "#});

    assert_eq!(
        compact(&schema, OperationKind::Query, "a", &SynthesisOptions::default()),
        "a { id b { id name } }"
    );
}

#[test]
fn self_reference_is_skipped() {
    let schema = schema(indoc! {r#"
        type Query {
          node: Node
        }

        type Node {
          id: ID!
          parent: Node
          children: [Node!]!
        }
    "#});

    assert_eq!(
        compact(&schema, OperationKind::Query, "node", &SynthesisOptions::default()),
        "node { id }"
    );
}

#[test]
fn sibling_fields_of_the_same_type_both_expand() {
    let schema = schema(indoc! {r#"
        type Query {
          pair: Pair
        }

        type Pair {
          left: Item
          right: Item
        }

        type Item {
          id: ID!
        }
    "#});

    assert_eq!(
        compact(&schema, OperationKind::Query, "pair", &SynthesisOptions::default()),
        "pair { left { id } right { id } }"
    );
}

const BLOG: &str = indoc! {r#"
    type Query {
      post(id: ID!): Post
      user(id: ID!): User
    }

    type Post {
      id: ID!
      title: String!
      author: User!
      comments: [Comment!]!
    }

    type Comment {
      id: ID!
      body: String!
      author: User!
    }

    type User {
      id: ID!
      uuid: String!
      name: String!
    }
"#};

#[test]
fn models_collapse_below_the_root() {
    let schema = schema(BLOG);
    let options = SynthesisOptions::default().with_models(["User"]);

    assert_eq!(
        compact(&schema, OperationKind::Query, "post", &options),
        "post(id: $id) { id title author { id } comments { id body author { id } } }"
    );
}

#[test]
fn model_at_the_root_is_expanded() {
    let schema = schema(BLOG);
    let options = SynthesisOptions::default().with_models(["User"]);

    assert_eq!(
        compact(&schema, OperationKind::Query, "user", &options),
        "user(id: $id) { id uuid name }"
    );
}

#[test]
fn ignored_type_is_never_collapsed() {
    let schema = schema(BLOG);
    let options = SynthesisOptions::default().with_models(["User"]).with_ignore(["User"]);

    assert_eq!(
        compact(&schema, OperationKind::Query, "post", &options),
        "post(id: $id) { id title author { id uuid name } comments { id body author { id uuid name } } }"
    );
}

#[test]
fn ignored_field_path_only_affects_that_field() {
    let schema = schema(BLOG);
    let options = SynthesisOptions::default()
        .with_models(["User"])
        .with_ignore(["Comment.author"]);

    assert_eq!(
        compact(&schema, OperationKind::Query, "post", &options),
        "post(id: $id) { id title author { id } comments { id body author { id uuid name } } }"
    );
}

#[test]
fn custom_identifier_field() {
    let schema = schema(BLOG);
    let options = SynthesisOptions::default()
        .with_models(["User"])
        .with_identifier_field("uuid");

    assert_eq!(
        compact(&schema, OperationKind::Query, "post", &options),
        "post(id: $id) { id title author { uuid } comments { id body author { uuid } } }"
    );
}

const FEED: &str = indoc! {r#"
    type Query {
      feed(first: Int): Feed
    }

    type Feed {
      items(first: Int, after: String): [Item!]!
    }

    type Item {
      id: ID!
      comments(first: Int): [Comment!]!
    }

    type Comment {
      id: ID!
    }
"#};

#[test]
fn nested_arguments_are_named_after_their_path() {
    let schema = schema(FEED);

    let document = build_operation(&schema, OperationKind::Query, "feed", &SynthesisOptions::default()).unwrap();

    insta::assert_snapshot!(document, @r###"
    query feed_query($first: Int, $feedItemsFirst: Int, $feedItemsAfter: String, $feedItemsCommentsFirst: Int) {
      feed(first: $first) {
        items(first: $feedItemsFirst, after: $feedItemsAfter) {
          id
          comments(first: $feedItemsCommentsFirst) {
            id
          }
        }
      }
    }
    "###);
}

#[test]
fn synthesis_is_deterministic() {
    let schema = schema(FEED);
    let options = SynthesisOptions::default();

    let first = build_operation(&schema, OperationKind::Query, "feed", &options).unwrap();
    let second = build_operation(&schema, OperationKind::Query, "feed", &options).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn union_members_become_inline_fragments() {
    let schema = schema(indoc! {r#"
        type Query {
          search(term: String!): [SearchResult!]!
        }

        union SearchResult = User | Group

        type User {
          id: ID!
          items(first: Int): [String!]!
        }

        type Group {
          id: ID!
          items(first: Int): [String!]!
        }
    "#});

    let document = build_operation(&schema, OperationKind::Query, "search", &SynthesisOptions::default()).unwrap();

    insta::assert_snapshot!(document, @r###"
    query search_query($term: String!, $searchItemsFirst: Int, $searchItemsFirst2: Int) {
      search(term: $term) {
        ... on User {
          id
          items(first: $searchItemsFirst)
        }
        ... on Group {
          id
          items(first: $searchItemsFirst2)
        }
      }
    }
    "###);
}

#[test]
fn union_members_follow_model_rules() {
    let schema = schema(indoc! {r#"
        type Query {
          post: Post
        }

        type Post {
          id: ID!
          attachment: Attachment
        }

        union Attachment = User | File

        type User {
          id: ID!
          name: String!
        }

        type File {
          url: String!
        }
    "#});

    let options = SynthesisOptions::default().with_models(["User"]);
    assert_eq!(
        compact(&schema, OperationKind::Query, "post", &options),
        "post { id attachment { ... on User { id } ... on File { url } } }"
    );

    let options = options.with_ignore(["Post.attachment"]);
    assert_eq!(
        compact(&schema, OperationKind::Query, "post", &options),
        "post { id attachment { ... on User { id name } ... on File { url } } }"
    );
}

#[test]
fn union_member_on_the_current_path_is_dropped() {
    let schema = schema(indoc! {r#"
        type Query {
          viewer: User
          search: [SearchResult!]!
        }

        union SearchResult = User | Group

        type User {
          id: ID!
          memberships: [SearchResult!]!
        }

        type Group {
          id: ID!
          name: String!
          owner: User
        }
    "#});

    let options = SynthesisOptions::default();
    let document = build_operation(&schema, OperationKind::Query, "viewer", &options).unwrap();

    insta::assert_snapshot!(document, @r###"
    query viewer_query {
      viewer {
        id
        memberships {
          ... on Group {
            id
            name
          }
        }
      }
    }
    "###);

    let memberships = document
        .root_field()
        .selection_set
        .as_ref()
        .and_then(|selection_set| selection_set.field("memberships"))
        .and_then(|field| field.selection_set.as_ref())
        .unwrap();
    assert!(memberships.fragment("User").is_none());
    let group_fields = memberships
        .fragment("Group")
        .unwrap()
        .selection_set
        .fields()
        .map(|field| field.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(group_fields, vec!["id", "name"]);

    // Starting from the union, each branch only guards its own path.
    assert_eq!(
        compact(&schema, OperationKind::Query, "search", &options),
        "search { ... on User { id } ... on Group { id name owner { id } } }"
    );
    assert_eq!(schema.definition("SearchResult").unwrap().name(), "SearchResult");
}

#[test]
fn interfaces_expand_to_implementors() {
    let schema = schema(indoc! {r#"
        type Query {
          node(id: ID!): Node
          named: Named
        }

        interface Node {
          id: ID!
        }

        interface Named {
          name: String!
        }

        type User implements Node {
          id: ID!
          name: String!
        }

        type Post implements Node {
          id: ID!
          title: String!
        }
    "#});

    let options = SynthesisOptions::default();

    assert_eq!(
        compact(&schema, OperationKind::Query, "node", &options),
        "node(id: $id) { ... on User { id name } ... on Post { id title } }"
    );
    assert_eq!(compact(&schema, OperationKind::Query, "named", &options), "named { name }");
}

const DEEP: &str = indoc! {r#"
    type Query {
      a: A
    }

    type A {
      id: ID!
      b: B
    }

    type B {
      id: ID!
      c: C
    }

    type C {
      id: ID!
    }
"#};

#[test]
fn depth_limit_drops_nested_composites() {
    let schema = schema(DEEP);

    assert_eq!(
        compact(&schema, OperationKind::Query, "a", &SynthesisOptions::default()),
        "a { id b { id c { id } } }"
    );
    assert_eq!(
        compact(&schema, OperationKind::Query, "a", &SynthesisOptions::default().with_depth_limit(1)),
        "a { id b { id } }"
    );
    assert_eq!(
        compact(&schema, OperationKind::Query, "a", &SynthesisOptions::default().with_depth_limit(0)),
        "a { id }"
    );
}

#[test]
fn empty_selection_falls_back_to_typename() {
    let schema = schema(indoc! {r#"
        type Query {
          a: A
        }

        type A {
          b: B
        }

        type B {
          a: A
        }
    "#});

    assert_eq!(
        compact(&schema, OperationKind::Query, "a", &SynthesisOptions::default()),
        "a { b { __typename } }"
    );
}

#[test]
fn scalar_root_field_has_no_selection_set() {
    let schema = schema(CHAT);

    let document = build_operation(&schema, OperationKind::Query, "ping", &SynthesisOptions::default()).unwrap();

    assert!(document.root_field().selection_set.is_none());
    insta::assert_snapshot!(document, @r###"
    query ping_query {
      ping
    }
    "###);
}

#[test]
fn missing_root_type() {
    let schema = schema(CHAT);

    let error = build_operation(&schema, OperationKind::Mutation, "send", &SynthesisOptions::default()).unwrap_err();

    assert_eq!(error, SynthesisError::MissingRootType(OperationKind::Mutation));
    assert_eq!(error.to_string(), "the schema does not define a mutation root type");
}

#[test]
fn unknown_root_field() {
    let schema = schema(CHAT);

    let error =
        build_operation(&schema, OperationKind::Subscription, "messageRemoved", &SynthesisOptions::default()).unwrap_err();

    assert_eq!(
        error.to_string(),
        "the subscription root type has no field named `messageRemoved`"
    );
}

#[test]
fn one_document_per_subscription_field() {
    let schema = schema(indoc! {r#"
        type Query {
          ping: Boolean
        }

        type Subscription {
          tick: Int!
          statusChanged(id: ID!): Status
          messageAdded: Message
        }

        enum Status {
          ONLINE
          OFFLINE
        }

        type Message {
          id: ID!
        }
    "#});

    let documents = build_root_operations(&schema, OperationKind::Subscription, &SynthesisOptions::default()).unwrap();

    let rendered = documents
        .iter()
        .map(|document| (document.operation_name(), document.root_field().to_string()))
        .collect::<Vec<_>>();

    assert_eq!(
        rendered,
        vec![
            ("tick_subscription", "tick".to_owned()),
            ("statusChanged_subscription", "statusChanged(id: $id)".to_owned()),
            ("messageAdded_subscription", "messageAdded { id }".to_owned()),
        ]
    );
}
