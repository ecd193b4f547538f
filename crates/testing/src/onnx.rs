use prost::Message;

/// The subset of `onnx.proto` needed to describe single-node graphs.
/// `oneof` fields are declared as optional fields with the same tags,
/// which is identical on the wire.
#[derive(Clone, PartialEq, Message)]
pub struct ModelProto {
    #[prost(int64, tag = "1")]
    pub ir_version: i64,
    #[prost(message, optional, tag = "7")]
    pub graph: Option<GraphProto>,
    #[prost(message, repeated, tag = "8")]
    pub opset_import: Vec<OperatorSetIdProto>,
}

#[derive(Clone, PartialEq, Message)]
pub struct OperatorSetIdProto {
    #[prost(string, tag = "1")]
    pub domain: String,
    #[prost(int64, tag = "2")]
    pub version: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct GraphProto {
    #[prost(message, repeated, tag = "1")]
    pub node: Vec<NodeProto>,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(message, repeated, tag = "11")]
    pub input: Vec<ValueInfoProto>,
    #[prost(message, repeated, tag = "12")]
    pub output: Vec<ValueInfoProto>,
}

#[derive(Clone, PartialEq, Message)]
pub struct NodeProto {
    #[prost(string, repeated, tag = "1")]
    pub input: Vec<String>,
    #[prost(string, repeated, tag = "2")]
    pub output: Vec<String>,
    #[prost(string, tag = "4")]
    pub op_type: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct ValueInfoProto {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub r#type: Option<TypeProto>,
}

#[derive(Clone, PartialEq, Message)]
pub struct TypeProto {
    #[prost(message, optional, tag = "1")]
    pub tensor_type: Option<TensorTypeProto>,
}

#[derive(Clone, PartialEq, Message)]
pub struct TensorTypeProto {
    #[prost(int32, tag = "1")]
    pub elem_type: i32,
    #[prost(message, optional, tag = "2")]
    pub shape: Option<TensorShapeProto>,
}

#[derive(Clone, PartialEq, Message)]
pub struct TensorShapeProto {
    #[prost(message, repeated, tag = "1")]
    pub dim: Vec<Dimension>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Dimension {
    #[prost(int64, optional, tag = "1")]
    pub dim_value: Option<i64>,
    #[prost(string, optional, tag = "2")]
    pub dim_param: Option<String>,
}

pub const FLOAT: i32 = 1;
const OPSET_VERSION: i64 = 13;
const IR_VERSION: i64 = 7;

/// A tensor axis: either a fixed size or a named symbolic one.
#[derive(Debug, Clone, Copy)]
pub enum Dim {
    Value(i64),
    Param(&'static str),
}

fn value_info(name: &str, dims: &[Dim]) -> ValueInfoProto {
    let dim = dims
        .iter()
        .map(|d| match *d {
            Dim::Value(v) => Dimension {
                dim_value: Some(v),
                dim_param: None,
            },
            Dim::Param(p) => Dimension {
                dim_value: None,
                dim_param: Some(p.to_string()),
            },
        })
        .collect();
    ValueInfoProto {
        name: name.to_string(),
        r#type: Some(TypeProto {
            tensor_type: Some(TensorTypeProto {
                elem_type: FLOAT,
                shape: Some(TensorShapeProto { dim }),
            }),
        }),
    }
}

/// Serializes `y = op_type(x)` with `f32` input `x` and output `y`.
pub fn single_op_model(op_type: &str, input: &[Dim], output: &[Dim]) -> Vec<u8> {
    ModelProto {
        ir_version: IR_VERSION,
        graph: Some(GraphProto {
            node: vec![NodeProto {
                input: vec!["x".into()],
                output: vec!["y".into()],
                op_type: op_type.to_string(),
            }],
            name: op_type.to_lowercase(),
            input: vec![value_info("x", input)],
            output: vec![value_info("y", output)],
        }),
        opset_import: vec![OperatorSetIdProto {
            domain: String::new(),
            version: OPSET_VERSION,
        }],
    }
    .encode_to_vec()
}

/// `y = Identity(x)`, `x, y: f32[N, classes]`.
pub fn identity_model(classes: i64) -> Vec<u8> {
    let dims = [Dim::Param("N"), Dim::Value(classes)];
    single_op_model("Identity", &dims, &dims)
}

/// `y = GlobalAveragePool(x)`, `x: f32[N, 3, size, size]`, `y: f32[N, 3, 1, 1]`.
pub fn global_average_pool_model(size: i64) -> Vec<u8> {
    single_op_model(
        "GlobalAveragePool",
        &[Dim::Param("N"), Dim::Value(3), Dim::Value(size), Dim::Value(size)],
        &[Dim::Param("N"), Dim::Value(3), Dim::Value(1), Dim::Value(1)],
    )
}

#[test]
fn decodes_back() {
    let bytes = identity_model(3);
    let model = ModelProto::decode(bytes.as_slice()).unwrap();
    assert_eq!(model.ir_version, IR_VERSION);
    assert_eq!(model.opset_import[0].version, OPSET_VERSION);
    let graph = model.graph.unwrap();
    assert_eq!(graph.node[0].op_type, "Identity");
    let shape = graph.input[0]
        .r#type
        .as_ref()
        .and_then(|t| t.tensor_type.as_ref())
        .and_then(|t| t.shape.as_ref())
        .unwrap();
    assert_eq!(shape.dim[0].dim_param.as_deref(), Some("N"));
    assert_eq!(shape.dim[1].dim_value, Some(3));
}
