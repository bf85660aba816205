//! Integration tests against a real PostgreSQL database.
//!
//! Run with:
//! `DATABASE_URL=postgres://... cargo test -p recetario-db --features migrations -- --ignored`

use recetario_core::{
    CategoryDirectory, Error, FavoritesService, PageRequest, RatingRepository, RatingSubmission,
    RecipeClause, RecipeQuery, RecipeRepository, UserDirectory,
};
use recetario_db::test_fixtures::{sample_recipe, TestDatabase};
use uuid::Uuid;

async fn connect() -> TestDatabase {
    dotenvy::dotenv().ok();
    TestDatabase::new().await
}

fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_insert_and_fetch_round_trip() {
    let test_db = connect().await;
    let db = &test_db.db;

    let author = db.users.register(&unique("author")).await.unwrap();
    let category = db.categories.ensure(&unique("Soup")).await.unwrap();
    let mut req = sample_recipe("Leek soup", &["leek", "potato"], 40);
    req.categories = vec![category.id, category.id];

    let id = db.recipes.insert(author, req).await.unwrap();
    let recipe = db.recipes.fetch(id).await.unwrap().expect("recipe stored");

    assert_eq!(recipe.name, "Leek soup");
    assert_eq!(recipe.author_id, author);
    assert_eq!(recipe.ingredients.len(), 2);
    assert_eq!(recipe.category_ids, vec![category.id]);
    assert_eq!(recipe.average_rating, 0.0);

    assert!(db.recipes.fetch(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_search_page_filters_by_author_and_ingredient() {
    let test_db = connect().await;
    let db = &test_db.db;

    let author = db.users.register(&unique("chef")).await.unwrap();
    let marker = unique("tomatillo");
    for n in 0..3 {
        db.recipes
            .insert(author, sample_recipe(&format!("Salsa {}", n), &[marker.as_str()], 10))
            .await
            .unwrap();
    }
    db.recipes
        .insert(author, sample_recipe("Slow salsa", &[marker.as_str()], 90))
        .await
        .unwrap();

    let query = RecipeQuery::from_clauses(vec![
        RecipeClause::AuthorIn(vec![author]),
        RecipeClause::Ingredient {
            fragment: marker.to_uppercase(),
            include: true,
        },
        RecipeClause::MaxPrepTime(20),
    ]);
    let page = db
        .recipes
        .search_page(&query, &PageRequest::new(Some(1), Some(2)))
        .await
        .unwrap();

    assert_eq!(page.total, 3);
    assert_eq!(page.recipes.len(), 2);
    assert!(page.recipes[0].created_at >= page.recipes[1].created_at);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_category_clause_matches_by_name() {
    let test_db = connect().await;
    let db = &test_db.db;

    let author = db.users.register(&unique("chef")).await.unwrap();
    let name = unique("Brunch");
    let category = db.categories.ensure(&name).await.unwrap();
    let mut req = sample_recipe("Pancakes", &["flour"], 15);
    req.categories = vec![category.id];
    let id = db.recipes.insert(author, req).await.unwrap();

    let query = RecipeQuery::from_clauses(vec![RecipeClause::CategoryIn(vec![name])]);
    let page = db
        .recipes
        .search_page(&query, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.recipes[0].id, id);

    let names = db.categories.names_for(&[category.id]).await.unwrap();
    assert_eq!(names.get(&category.id), Some(&category.name));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_rating_upsert_recomputes_average() {
    let test_db = connect().await;
    let db = &test_db.db;

    let author = db.users.register(&unique("author")).await.unwrap();
    let a = db.users.register(&unique("rater-a")).await.unwrap();
    let b = db.users.register(&unique("rater-b")).await.unwrap();
    let c = db.users.register(&unique("rater-c")).await.unwrap();
    let recipe = db
        .recipes
        .insert(author, sample_recipe("Toast", &["bread"], 5))
        .await
        .unwrap();

    let rate = |user: Uuid, score: i64| RatingSubmission::new(recipe, user, score, None).unwrap();

    db.ratings.upsert_and_recompute(&rate(a, 3)).await.unwrap();
    let write = db.ratings.upsert_and_recompute(&rate(b, 5)).await.unwrap();
    assert_eq!(write.average, 4.0);

    let write = db.ratings.upsert_and_recompute(&rate(c, 4)).await.unwrap();
    assert_eq!(write.average, 4.0);
    assert_eq!(write.total_ratings, 3);

    let first = db.ratings.list_for_recipe(recipe).await.unwrap();
    let c_rating_id = first.iter().find(|r| r.author_id == c).unwrap().id;

    let write = db.ratings.upsert_and_recompute(&rate(c, 2)).await.unwrap();
    assert!(!write.created);
    assert_eq!(write.rating.id, c_rating_id);
    assert_eq!(write.average, 3.3);
    assert_eq!(write.total_ratings, 3);

    let stored = db.recipes.fetch(recipe).await.unwrap().unwrap();
    assert_eq!(stored.average_rating, 3.3);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_rating_rejects_self_and_missing_recipe() {
    let test_db = connect().await;
    let db = &test_db.db;

    let author = db.users.register(&unique("author")).await.unwrap();
    let recipe = db
        .recipes
        .insert(author, sample_recipe("Toast", &["bread"], 5))
        .await
        .unwrap();

    let err = db
        .ratings
        .upsert_and_recompute(&RatingSubmission::new(recipe, author, 5, None).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));

    let missing = Uuid::new_v4();
    let err = db
        .ratings
        .upsert_and_recompute(&RatingSubmission::new(missing, author, 5, None).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::RecipeNotFound(id) if id == missing));

    assert!(db.ratings.list_for_recipe(recipe).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_concurrent_raters_all_counted() {
    let test_db = connect().await;
    let db = test_db.db.clone();

    let author = db.users.register(&unique("author")).await.unwrap();
    let recipe = db
        .recipes
        .insert(author, sample_recipe("Stew", &["beef"], 120))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for n in 0..8 {
        let db = db.clone();
        let user = db.users.register(&unique(&format!("rater{}", n))).await.unwrap();
        handles.push(tokio::spawn(async move {
            let score = (n % 5 + 1) as i64;
            db.ratings
                .upsert_and_recompute(&RatingSubmission::new(recipe, user, score, None).unwrap())
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // Scores 1,2,3,4,5,1,2,3 -> 21 / 8 = 2.625 -> 2.6
    let stored = db.recipes.fetch(recipe).await.unwrap().unwrap();
    assert_eq!(stored.average_rating, 2.6);
    assert_eq!(db.ratings.list_for_recipe(recipe).await.unwrap().len(), 8);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_author_lookup_and_favorites() {
    let test_db = connect().await;
    let db = &test_db.db;

    let name = unique("Ana_Maria");
    let ana = db.users.register(&name).await.unwrap();
    assert_eq!(db.users.find_ids_by_name(&name.to_lowercase()).await.unwrap(), vec![ana]);
    // Underscore is literal, not a single-character wildcard.
    assert!(db
        .users
        .find_ids_by_name(&name.replace('_', "x"))
        .await
        .unwrap()
        .is_empty());

    let recipe = db
        .recipes
        .insert(ana, sample_recipe("Toast", &["bread"], 5))
        .await
        .unwrap();
    db.favorites.add(ana, recipe).await.unwrap();
    db.favorites.add(ana, recipe).await.unwrap();
    let favs = db.favorites.favorited_among(ana, &[recipe]).await.unwrap();
    assert!(favs.contains(&recipe));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_unknown_references_are_validation_errors() {
    let test_db = connect().await;
    let db = &test_db.db;

    let err = db
        .recipes
        .insert(Uuid::new_v4(), sample_recipe("Orphan", &["salt"], 5))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation { ref field, .. } if field == "authorId"));
    assert!(!err.is_retryable());

    let author = db.users.register(&unique("chef")).await.unwrap();
    let mut req = sample_recipe("Uncategorized", &["salt"], 5);
    req.categories = vec![Uuid::new_v4()];
    let err = db.recipes.insert(author, req).await.unwrap_err();
    assert!(matches!(err, Error::Validation { ref field, .. } if field == "categories"));

    let recipe = db
        .recipes
        .insert(author, sample_recipe("Toast", &["bread"], 5))
        .await
        .unwrap();
    let submission = RatingSubmission::new(recipe, Uuid::new_v4(), 4, None).unwrap();
    let err = db.ratings.upsert_and_recompute(&submission).await.unwrap_err();
    assert!(matches!(err, Error::Validation { ref field, .. } if field == "authorId"));
    assert!(db.ratings.list_for_recipe(recipe).await.unwrap().is_empty());
}
