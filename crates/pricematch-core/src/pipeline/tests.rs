use super::*;
use crate::embedding::{MockEmbedder, TextEmbedder};
use crate::extraction::{ExtractedProduct, MockExtractor};
use crate::ingest::CatalogRow;
use crate::query::{self, ExactFilters};
use crate::reranker::MockReranker;
use crate::vectordb::{CatalogIndex, MockCatalogIndex, ProductPayload, ProductVectorRecord};

const DIM: usize = 8;

fn test_config() -> PipelineConfig {
    PipelineConfig::new()
        .with_collection_name("test_products")
        .with_embedding_dim(DIM)
        .with_score_threshold(0.5)
        .with_min_match_score(0.7)
}

fn product(name: &str, brand: &str, unit: &str) -> ExtractedProduct {
    ExtractedProduct {
        normalized_name: name.to_string(),
        product_subtype: None,
        catalog_price: 1000.0,
        discount_percent: None,
        brand: Some(brand.to_string()),
        pack_count: 1,
        unit_of_measure: unit.to_string(),
        quantity_description: String::new(),
        inferred_category: None,
        confidence: 0.95,
        provenance: "test".to_string(),
        wholesaler: None,
    }
}

/// Seeds the index with a point whose vector is exactly what the pipeline
/// will embed for `product`, so the mock search returns it at cosine 1.0.
async fn seed_match(
    index: &MockCatalogIndex,
    embedder: &MockEmbedder,
    id: u64,
    product: &ExtractedProduct,
) {
    let vector = embedder
        .embed(&query::build_query_text(product))
        .await
        .unwrap();
    let payload = ProductPayload {
        codigo: Some(id as i64),
        marca: product.brand.as_ref().map(|b| b.trim().to_uppercase()),
        peso: Some(crate::units::normalize(&product.unit_of_measure)),
        precio: Some(999.0),
        ..Default::default()
    };
    index
        .upsert(
            "test_products",
            vec![ProductVectorRecord::new(id, vector, payload)],
        )
        .await
        .unwrap();
}

async fn seeded_index(embedder: &MockEmbedder, products: &[(u64, &ExtractedProduct)]) -> MockCatalogIndex {
    let index = MockCatalogIndex::new();
    index
        .ensure_collection("test_products", DIM as u64)
        .await
        .unwrap();
    for (id, p) in products {
        seed_match(&index, embedder, *id, p).await;
    }
    index
}

#[test]
fn test_wholesaler_tag_from_filename() {
    assert_eq!(
        wholesaler_tag_from_filename(Some("diarco_ofertas_julio.jpg")),
        "DIARCO"
    );
    assert_eq!(
        wholesaler_tag_from_filename(Some("Maxiconsumo-catalogo.png")),
        "MAXICONSUMO"
    );
    assert_eq!(wholesaler_tag_from_filename(Some("vital catalogo.jpg")), "VITAL");
    assert_eq!(wholesaler_tag_from_filename(Some("yaguar")), "YAGUAR");
    assert_eq!(wholesaler_tag_from_filename(None), "DESCONOCIDO");
    assert_eq!(wholesaler_tag_from_filename(Some(".jpg")), "DESCONOCIDO");
}

#[tokio::test]
async fn test_process_image_matches_and_tags_products() {
    let embedder = MockEmbedder::new(DIM);
    let p = product("MAYONESA NATURA", "NATURA", "250g");
    let index = seeded_index(&embedder, &[(1, &p)]).await;

    let pipeline = CatalogPipeline::new(
        MockExtractor::with_products(vec![p]),
        embedder,
        index,
        None::<MockReranker>,
        test_config(),
    )
    .unwrap();

    let response = pipeline
        .process_image(b"img", "image/jpeg", Some("diarco_julio.jpg"), None)
        .await
        .unwrap();

    assert!(response.success);
    assert_eq!(response.data.products_processed, 1);
    assert_eq!(response.metadata.wholesaler_tag, "DIARCO");

    let item = &response.data.preview[0];
    assert_eq!(item.producto_extraido.wholesaler.as_deref(), Some("DIARCO"));
    assert_eq!(item.total_coincidencias, 1);
    assert_eq!(item.coincidencias[0].id, 1);
    // Brand matched, so the adjusted score carries the boost.
    assert!(item.coincidencias[0].score_ajustado > item.coincidencias[0].score);
    assert!(item.error.is_none());
}

#[tokio::test]
async fn test_process_image_one_failure_never_drops_the_batch() {
    let embedder = MockEmbedder::new(DIM).with_failure_on("SEGUNDO");
    let p1 = product("PRIMERO", "A", "250g");
    let p2 = product("SEGUNDO", "B", "250g");
    let p3 = product("TERCERO", "C", "250g");
    let index = seeded_index(&embedder, &[(1, &p1), (3, &p3)]).await;

    let pipeline = CatalogPipeline::new(
        MockExtractor::with_products(vec![p1, p2, p3]),
        embedder,
        index,
        None::<MockReranker>,
        test_config(),
    )
    .unwrap();

    let response = pipeline
        .process_image(b"img", "image/jpeg", Some("x.jpg"), None)
        .await
        .unwrap();

    assert_eq!(response.data.preview.len(), 3);
    let items = &response.data.preview;
    assert!(items[0].error.is_none());
    assert_eq!(items[0].total_coincidencias, 1);

    assert!(items[1].error.is_some());
    assert_eq!(items[1].total_coincidencias, 0);

    assert!(items[2].error.is_none());
    assert_eq!(items[2].total_coincidencias, 1);
}

#[tokio::test]
async fn test_process_image_skips_invalid_products() {
    let embedder = MockEmbedder::new(DIM);
    let bad = product("  ", "A", "250g");
    let good = product("BUENO", "A", "250g");
    let index = seeded_index(&embedder, &[(1, &good)]).await;

    let pipeline = CatalogPipeline::new(
        MockExtractor::with_products(vec![bad, good]),
        embedder,
        index,
        None::<MockReranker>,
        test_config(),
    )
    .unwrap();

    let response = pipeline
        .process_image(b"img", "image/jpeg", None, None)
        .await
        .unwrap();
    assert_eq!(response.data.products_processed, 1);
    assert_eq!(
        response.data.preview[0].producto_extraido.normalized_name,
        "BUENO"
    );
}

#[tokio::test]
async fn test_process_image_extraction_failure_is_a_request_failure() {
    let embedder = MockEmbedder::new(DIM);
    let index = seeded_index(&embedder, &[]).await;
    let pipeline = CatalogPipeline::new(
        MockExtractor::failing(),
        embedder,
        index,
        None::<MockReranker>,
        test_config(),
    )
    .unwrap();

    let result = pipeline.process_image(b"img", "image/jpeg", None, None).await;
    assert!(matches!(result, Err(PipelineError::Extraction(_))));
}

#[tokio::test]
async fn test_rerank_prunes_mismatched_candidates() {
    let embedder = MockEmbedder::new(DIM);
    let p = product("YERBA TARAGUI", "TARAGUI", "1kg");
    let index = seeded_index(&embedder, &[(1, &p)]).await;

    // A same-vector candidate with the wrong brand also comes back from the
    // index; the re-ranker must drop it.
    let vector = embedder
        .embed(&query::build_query_text(&p))
        .await
        .unwrap();
    index
        .upsert(
            "test_products",
            vec![ProductVectorRecord::new(
                2,
                vector,
                ProductPayload {
                    marca: Some("OTRA".to_string()),
                    peso: Some("1KG".to_string()),
                    ..Default::default()
                },
            )],
        )
        .await
        .unwrap();

    let pipeline = CatalogPipeline::new(
        MockExtractor::with_products(vec![p]),
        embedder,
        index,
        Some(MockReranker::new()),
        test_config().with_rerank_enabled(true),
    )
    .unwrap();

    let response = pipeline
        .process_image(b"img", "image/jpeg", None, None)
        .await
        .unwrap();
    let item = &response.data.preview[0];
    assert_eq!(item.total_coincidencias, 1);
    assert_eq!(item.coincidencias[0].id, 1);
    assert!(item.error_llm.is_none());
}

#[tokio::test]
async fn test_rerank_failure_fails_closed_to_empty() {
    let embedder = MockEmbedder::new(DIM);
    let p = product("YERBA TARAGUI", "TARAGUI", "1kg");
    let index = seeded_index(&embedder, &[(1, &p)]).await;

    let pipeline = CatalogPipeline::new(
        MockExtractor::with_products(vec![p]),
        embedder,
        index,
        Some(MockReranker::failing()),
        test_config().with_rerank_enabled(true),
    )
    .unwrap();

    let response = pipeline
        .process_image(b"img", "image/jpeg", None, None)
        .await
        .unwrap();
    let item = &response.data.preview[0];
    assert!(item.coincidencias.is_empty());
    assert_eq!(item.total_coincidencias, 0);
    assert!(item.error_llm.is_some());
    // The matching stage itself succeeded.
    assert!(item.error.is_none());
}

#[tokio::test]
async fn test_rerank_disabled_even_with_reranker_present() {
    let embedder = MockEmbedder::new(DIM);
    let p = product("YERBA TARAGUI", "TARAGUI", "1kg");
    let index = seeded_index(&embedder, &[(1, &p)]).await;

    let pipeline = CatalogPipeline::new(
        MockExtractor::with_products(vec![p]),
        embedder,
        index,
        Some(MockReranker::failing()),
        test_config(),
    )
    .unwrap();

    let response = pipeline
        .process_image(b"img", "image/jpeg", None, None)
        .await
        .unwrap();
    assert!(response.data.preview[0].error_llm.is_none());
}

#[tokio::test]
async fn test_ingest_then_search_round_trip() {
    let embedder = MockEmbedder::new(DIM);
    let index = MockCatalogIndex::new();
    index
        .ensure_collection("test_products", DIM as u64)
        .await
        .unwrap();

    let pipeline = CatalogPipeline::new(
        MockExtractor::new(),
        embedder.clone(),
        index,
        None::<MockReranker>,
        test_config(),
    )
    .unwrap();

    let row = CatalogRow {
        codigo: "2001".to_string(),
        rubro: "ALMACEN".to_string(),
        marca: "NATURA".to_string(),
        descripcion: "MAYONESA NATURA 250G".to_string(),
        peso: "250 gr".to_string(),
        precio: 646.78,
    };
    let text = row.build_row_text();

    let count = pipeline.ingest_rows(vec![row]).await.unwrap();
    assert_eq!(count, 1);

    let hits = pipeline
        .search_text(&text, &ExactFilters::default(), None, None)
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, 2001);
    assert!(hits[0].score > 0.99);
    assert_eq!(hits[0].payload.peso.as_deref(), Some("250G"));
}

#[tokio::test]
async fn test_collection_admin_surface() {
    let embedder = MockEmbedder::new(DIM);
    let index = MockCatalogIndex::new();
    let pipeline = CatalogPipeline::new(
        MockExtractor::new(),
        embedder,
        index,
        None::<MockReranker>,
        test_config(),
    )
    .unwrap();

    pipeline.ensure_collection().await.unwrap();
    let summary = pipeline.collection_info().await.unwrap();
    assert_eq!(summary.name, "test_products");
    assert_eq!(summary.points_count, 0);

    pipeline.recreate_collection().await.unwrap();
    assert!(pipeline.collection_info().await.is_ok());
}
