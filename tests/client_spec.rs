use chrono::Utc;
use family_registry::api::create_router;
use family_registry::client::{ClientError, RegistryClient};
use family_registry::db::Database;
use family_registry::models::*;
use uuid::Uuid;

/// Serve a fresh in-memory registry on an ephemeral port.
async fn spawn_server() -> RegistryClient {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    let app = create_router(db);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    RegistryClient::new(format!("http://{}/", addr))
}

fn input(first: &str, last: &str) -> CreatePersonInput {
    CreatePersonInput {
        first_name: first.to_string(),
        last_name: last.to_string(),
        birthday: Utc::now().date_naive(),
    }
}

mod persons {
    use super::*;

    #[tokio::test]
    async fn creates_lists_and_fetches() {
        let client = spawn_server().await;

        let created = client
            .create_person(&input("Max", "Mustermann"))
            .await
            .expect("Create failed");
        let id = created.id.expect("Stored person has an id");

        let all = client.list_persons().await.expect("List failed");
        assert_eq!(all, vec![created.clone()]);

        let fetched = client.get_person(id).await.expect("Get failed");
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn blank_name_is_a_bad_request() {
        let client = spawn_server().await;

        let result = client.create_person(&input("  ", "Mustermann")).await;

        assert!(matches!(result, Err(ClientError::BadRequest(_))));
    }

    #[tokio::test]
    async fn deletes_and_then_reports_not_found() {
        let client = spawn_server().await;
        let person = client
            .create_person(&input("Max", "Mustermann"))
            .await
            .expect("Create failed");
        let id = person.id.expect("Stored person has an id");

        client.delete_person(id).await.expect("Delete failed");

        assert!(client.list_persons().await.expect("List failed").is_empty());
        assert!(matches!(
            client.get_person(id).await,
            Err(ClientError::NotFound(_))
        ));
        assert!(matches!(
            client.delete_person(id).await,
            Err(ClientError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let client = spawn_server().await;

        let result = client.get_person(Uuid::new_v4()).await;

        assert!(matches!(result, Err(ClientError::NotFound(_))));
    }
}

mod relationships {
    use super::*;

    #[tokio::test]
    async fn third_parent_is_a_bad_request_and_leaves_two() {
        let client = spawn_server().await;
        let child = client.create_person(&input("Wilfreda", "Steube")).await.unwrap();
        let child_id = child.id.unwrap();
        let first = client.create_person(&input("Reino", "Wendell")).await.unwrap();
        let second = client.create_person(&input("Ada", "Wendell")).await.unwrap();
        let third = client.create_person(&input("Otto", "Wendell")).await.unwrap();

        client.add_parent(child_id, &first).await.expect("First parent");
        let updated = client.add_parent(child_id, &second).await.expect("Second parent");
        assert_eq!(updated.parents.len(), 2);

        let result = client.add_parent(child_id, &third).await;
        assert!(matches!(result, Err(ClientError::BadRequest(_))));

        let parents = client.get_parents(child_id).await.expect("Parents failed");
        let mut names: Vec<_> = parents.iter().map(|p| p.first_name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["Ada", "Reino"]);
    }

    #[tokio::test]
    async fn unknown_child_is_not_found() {
        let client = spawn_server().await;
        let parent = client.create_person(&input("Reino", "Wendell")).await.unwrap();

        let result = client.add_parent(Uuid::new_v4(), &parent).await;

        assert!(matches!(result, Err(ClientError::NotFound(_))));
    }

    #[tokio::test]
    async fn lists_children_and_decodes_ancestry() {
        let client = spawn_server().await;
        let grandparent = client.create_person(&input("Otto", "Wendell")).await.unwrap();
        let parent = client.create_person(&input("Reino", "Wendell")).await.unwrap();
        let child = client.create_person(&input("Wilfreda", "Steube")).await.unwrap();
        let parent_id = parent.id.unwrap();
        let child_id = child.id.unwrap();

        client.add_parent(parent_id, &grandparent).await.unwrap();
        client.add_parent(child_id, &parent).await.unwrap();

        let children = client.get_children(parent_id).await.expect("Children failed");
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, Some(child_id));

        let tree = client.get_ancestry(child_id).await.expect("Ancestry failed");
        assert_eq!(tree.person.id, Some(child_id));
        assert_eq!(tree.ancestors.len(), 1);
        assert_eq!(tree.ancestors[0].person.id, Some(parent_id));
        assert_eq!(tree.ancestors[0].ancestors.len(), 1);
        assert_eq!(tree.ancestors[0].ancestors[0].person.id, grandparent.id);
    }

    #[tokio::test]
    async fn deleting_a_parent_shrinks_the_parent_list() {
        let client = spawn_server().await;
        let child = client.create_person(&input("Wilfreda", "Steube")).await.unwrap();
        let child_id = child.id.unwrap();
        let parent = client.create_person(&input("Reino", "Wendell")).await.unwrap();
        client.add_parent(child_id, &parent).await.unwrap();

        client.delete_person(parent.id.unwrap()).await.expect("Delete failed");

        assert!(client.get_parents(child_id).await.unwrap().is_empty());
        assert!(client.get_person(child_id).await.unwrap().parents.is_empty());
    }
}
