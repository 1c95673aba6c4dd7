use kbase_core::traits::Embedder;
use kbase_core::types::{ArticleRecord, Document};
use kbase_core::Error;
use kbase_embed::HashEmbedder;
use kbase_index::{similarity_from_distance, FlatL2Index};

fn doc(title: &str) -> Document {
    Document::from_record(ArticleRecord::new(title, format!("{title} body")))
}

fn seeded() -> FlatL2Index {
    let mut index = FlatL2Index::new(2);
    index
        .add(
            vec![vec![0.0, 0.0], vec![3.0, 4.0], vec![1.0, 0.0], vec![0.0, 1.0]],
            vec![doc("origin"), doc("far"), doc("east"), doc("north")],
        )
        .expect("add");
    index
}

#[test]
fn search_orders_by_squared_distance() {
    let index = seeded();
    let results = index.search(&[0.9, 0.0], 4).expect("search");

    let titles: Vec<&str> = results.iter().map(|r| r.document.title()).collect();
    assert_eq!(titles, ["east", "origin", "north", "far"]);
    let ranks: Vec<usize> = results.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, [1, 2, 3, 4]);
    for pair in results.windows(2) {
        assert!(pair[0].distance <= pair[1].distance);
    }
    // squared, not plain, Euclidean distance: (3-0.9)^2 + 4^2
    assert!((results[3].distance - 20.41).abs() < 1e-4, "{}", results[3].distance);
}

#[test]
fn similarity_is_one_over_one_plus_distance() {
    let index = seeded();
    let results = index.search(&[0.0, 0.0], 2).expect("search");
    assert_eq!(results[0].document.title(), "origin");
    assert_eq!(results[0].distance, 0.0);
    assert_eq!(results[0].similarity_score, 1.0);
    assert!((results[1].similarity_score - 0.5).abs() < 1e-6, "distance 1 maps to 0.5");
    for r in &results { assert!(r.similarity_score > 0.0 && r.similarity_score <= 1.0); }
}

#[test]
fn similarity_transform_is_monotonic_and_bounded() {
    let mut last = similarity_from_distance(0.0);
    assert_eq!(last, 1.0);
    for d in [0.1f32, 0.5, 1.0, 2.0, 4.0, 100.0, 1e6] {
        let s = similarity_from_distance(d);
        assert!(s < last && s > 0.0, "d={d} s={s}");
        last = s;
    }
}

#[test]
fn ties_go_to_earlier_insertion() {
    let index = seeded();
    // east and north are both at squared distance 1 from the origin
    let results = index.search(&[0.0, 0.0], 3).expect("search");
    assert_eq!(results[1].document.title(), "east");
    assert_eq!(results[2].document.title(), "north");
    assert_eq!(results[1].distance, results[2].distance);
}

#[test]
fn k_larger_than_index_returns_everything() {
    let index = seeded();
    assert_eq!(index.search(&[5.0, 5.0], 10).expect("search").len(), 4);
    assert_eq!(index.search(&[5.0, 5.0], 1).expect("search").len(), 1);
}

#[test]
fn empty_index_returns_no_results() {
    let index = FlatL2Index::new(8);
    assert!(index.is_empty());
    assert!(index.search(&[0.0; 8], 3).expect("search").is_empty());
}

#[test]
fn query_dimension_mismatch_fails() {
    let index = seeded();
    let err = index.search(&[1.0, 2.0, 3.0], 1).unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { expected: 2, actual: 3 }), "got {err:?}");
}

#[test]
fn rejected_batches_leave_the_index_untouched() {
    let mut index = seeded();

    let err = index.add(vec![vec![1.0, 1.0], vec![1.0, 1.0, 1.0]], vec![doc("ok"), doc("bad")]).unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { expected: 2, actual: 3 }));

    let err = index.add(vec![vec![1.0, 1.0]], vec![doc("a"), doc("b")]).unwrap_err();
    assert!(matches!(err, Error::LengthMismatch { vectors: 1, documents: 2 }));

    assert_eq!(index.len(), 4);
    assert_eq!(index.documents()[3].title(), "north");
    assert_eq!(index.vector(3), Some(&[0.0f32, 1.0][..]));
    assert_eq!(index.vector(4), None);
}

#[test]
fn positions_stay_aligned_across_batches() {
    let mut index = seeded();
    index.add(vec![vec![7.0, 7.0]], vec![doc("second batch")]).expect("add");
    let top = index.search(&[7.0, 7.0], 1).expect("search");
    assert_eq!(top[0].document.title(), "second batch");
    assert_eq!(index.vector(4), Some(&[7.0f32, 7.0][..]));
}

#[test]
fn embedded_text_finds_itself() {
    let embedder = HashEmbedder::new(256);
    let docs = vec![doc("Billing and invoices"), doc("Mobile app setup"), doc("Keyboard shortcuts")];
    let texts: Vec<String> = docs.iter().map(|d| d.text.clone()).collect();
    let vectors = embedder.embed_batch(&texts).expect("embed");
    let mut index = FlatL2Index::new(embedder.dim());
    index.add(vectors, docs).expect("add");

    for text in &texts {
        let q = embedder.embed_batch(std::slice::from_ref(text)).expect("embed").remove(0);
        let top = index.search(&q, 1).expect("search");
        assert_eq!(&top[0].document.text, text);
        assert!(top[0].distance.abs() < 1e-6);
    }
}
