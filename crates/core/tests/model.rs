use std::fs;

use imval_core::model::{ModelFormat, ModelLoadError, ModelSource};

#[test]
fn onnx_is_passed_by_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mobilenet.onnx");
    fs::write(&path, b"onnx").unwrap();

    let source = ModelSource::from_path(&path).unwrap();
    assert_eq!(source, ModelSource::Path(path.clone()));
    assert_eq!(source.format(), ModelFormat::Onnx);
    assert_eq!(source.path(), path);
}

#[test]
fn dfg_is_read_into_memory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mobilenet.dfg");
    fs::write(&path, [1u8, 2, 3, 4]).unwrap();

    let source = ModelSource::from_path(&path).unwrap();
    assert_eq!(source.format(), ModelFormat::Dfg);
    match source {
        ModelSource::Bytes { bytes, .. } => assert_eq!(bytes, vec![1, 2, 3, 4]),
        ModelSource::Path(_) => panic!("expected in-memory model"),
    }
}

#[test]
fn unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["model.pt", "model.ONNX.bak", "model"] {
        let path = dir.path().join(name);
        fs::write(&path, b"x").unwrap();
        assert!(matches!(
            ModelSource::from_path(&path),
            Err(ModelLoadError::UnsupportedFormat(p)) if p == path
        ));
    }
}

#[test]
fn missing_files() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        ModelSource::from_path(dir.path().join("none.onnx")),
        Err(ModelLoadError::NotFound(_))
    ));
    assert!(matches!(
        ModelSource::from_path(dir.path().join("none.dfg")),
        Err(ModelLoadError::NotFound(_))
    ));
}

#[test]
fn empty_dfg() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.dfg");
    fs::write(&path, b"").unwrap();
    assert!(matches!(
        ModelSource::from_path(&path),
        Err(ModelLoadError::Empty(_))
    ));
}

#[test]
fn debug_hides_bytes() {
    let source = ModelSource::Bytes {
        path: "m.dfg".into(),
        bytes: vec![0; 1024],
    };
    assert_eq!(format!("{source:?}"), r#"Bytes { path: "m.dfg", len: 1024 }"#);
}
