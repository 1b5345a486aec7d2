//! Shared in-memory descriptor fixtures for integration tests
//!
//! Builds a small descriptor image the way `buf build` would: provider
//! api/spec files, the shared kind enum and metadata protos, source info,
//! and `FieldOptions` payloads carrying both buf.validate rules and the
//! OpenMCF custom extensions.

#![allow(dead_code)]

use prost::Message;

use openmcf_codegen::descriptor::proto::{
    field_label, field_type, DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto,
    FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet, Location, MessageOptions,
    OneofDescriptorProto, SourceCodeInfo,
};
use openmcf_codegen::descriptor::DescriptorIndex;
use openmcf_codegen::extract::validation::{FieldRules, Int32Rules, RepeatedRules, StringRules};

/// FieldOptions as the OpenMCF protos populate them: the buf.validate
/// extension plus the custom foreign-key/default extensions.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TestFieldOptions {
    #[prost(message, optional, tag = "1159")]
    pub validate: Option<FieldRules>,
    #[prost(int32, optional, tag = "200001")]
    pub default_kind: Option<i32>,
    #[prost(string, optional, tag = "200002")]
    pub default_kind_field_path: Option<String>,
    #[prost(string, optional, tag = "60001")]
    pub default_value: Option<String>,
    #[prost(string, optional, tag = "60002")]
    pub recommended_default: Option<String>,
}

pub fn rules_options(rules: FieldRules) -> Vec<u8> {
    TestFieldOptions {
        validate: Some(rules),
        ..TestFieldOptions::default()
    }
    .encode_to_vec()
}

pub fn string_const_rules(value: &str) -> FieldRules {
    FieldRules {
        string: Some(StringRules {
            r#const: Some(value.to_string()),
            ..StringRules::default()
        }),
        ..FieldRules::default()
    }
}

pub fn scalar_field(name: &str, number: i32, ftype: i32) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(field_label::OPTIONAL),
        r#type: Some(ftype),
        ..FieldDescriptorProto::default()
    }
}

pub fn message_field(name: &str, number: i32, type_name: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(field_label::OPTIONAL),
        r#type: Some(field_type::MESSAGE),
        type_name_raw: Some(format!(".{}", type_name)),
        ..FieldDescriptorProto::default()
    }
}

pub fn repeated(mut field: FieldDescriptorProto) -> FieldDescriptorProto {
    field.label = Some(field_label::REPEATED);
    field
}

pub fn with_rules(mut field: FieldDescriptorProto, rules: FieldRules) -> FieldDescriptorProto {
    field.options = Some(rules_options(rules));
    field
}

pub fn with_options(mut field: FieldDescriptorProto, options: TestFieldOptions) -> FieldDescriptorProto {
    field.options = Some(options.encode_to_vec());
    field
}

fn kind_enum_file() -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some("org/openmcf/shared/cloudresourcekind/cloud_resource_kind.proto".to_string()),
        package: Some("org.openmcf.shared.cloudresourcekind".to_string()),
        message_type: vec![],
        enum_type: vec![EnumDescriptorProto {
            name: Some("CloudResourceKind".to_string()),
            value: vec![
                EnumValueDescriptorProto {
                    name: Some("cloud_resource_kind_unspecified".to_string()),
                    number: Some(0),
                },
                EnumValueDescriptorProto {
                    name: Some("AwsVpc".to_string()),
                    number: Some(1),
                },
                EnumValueDescriptorProto {
                    name: Some("AwsEksCluster".to_string()),
                    number: Some(2),
                },
                EnumValueDescriptorProto {
                    name: Some("Foo".to_string()),
                    number: Some(3),
                },
            ],
        }],
        source_code_info: None,
    }
}

fn metadata_file() -> FileDescriptorProto {
    let labels_entry = DescriptorProto {
        name: Some("LabelsEntry".to_string()),
        field: vec![
            scalar_field("key", 1, field_type::STRING),
            scalar_field("value", 2, field_type::STRING),
        ],
        options: Some(MessageOptions {
            map_entry: Some(true),
        }),
        ..DescriptorProto::default()
    };

    FileDescriptorProto {
        name: Some("org/openmcf/shared/metadata.proto".to_string()),
        package: Some("org.openmcf.shared".to_string()),
        message_type: vec![DescriptorProto {
            name: Some("CloudResourceMetadata".to_string()),
            field: vec![
                with_rules(
                    scalar_field("name", 1, field_type::STRING),
                    FieldRules {
                        required: Some(true),
                        string: Some(StringRules {
                            min_len: Some(1),
                            ..StringRules::default()
                        }),
                        ..FieldRules::default()
                    },
                ),
                repeated(message_field(
                    "labels",
                    2,
                    "org.openmcf.shared.CloudResourceMetadata.LabelsEntry",
                )),
            ],
            nested_type: vec![labels_entry],
            ..DescriptorProto::default()
        }],
        enum_type: vec![],
        source_code_info: None,
    }
}

fn eks_api_file() -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some("org/openmcf/provider/aws/eks-cluster/v1/api.proto".to_string()),
        package: Some("org.openmcf.provider.aws.ekscluster.v1".to_string()),
        message_type: vec![DescriptorProto {
            name: Some("AwsEksCluster".to_string()),
            field: vec![
                with_rules(
                    scalar_field("api_version", 1, field_type::STRING),
                    string_const_rules("aws.openmcf.org/v1"),
                ),
                with_rules(
                    scalar_field("kind", 2, field_type::STRING),
                    string_const_rules("AwsEksCluster"),
                ),
            ],
            ..DescriptorProto::default()
        }],
        enum_type: vec![],
        source_code_info: Some(SourceCodeInfo {
            location: vec![Location {
                path: vec![4, 0],
                leading_comments: Some(" An EKS cluster on AWS.\n".to_string()),
            }],
        }),
    }
}

fn eks_spec_file() -> FileDescriptorProto {
    let package = "org.openmcf.provider.aws.ekscluster.v1";

    let labels_entry = DescriptorProto {
        name: Some("LabelsEntry".to_string()),
        field: vec![
            scalar_field("key", 1, field_type::STRING),
            scalar_field("value", 2, field_type::STRING),
        ],
        options: Some(MessageOptions {
            map_entry: Some(true),
        }),
        ..DescriptorProto::default()
    };

    let spec = DescriptorProto {
        name: Some("AwsEksClusterSpec".to_string()),
        field: vec![
            with_rules(
                repeated(scalar_field("subnet_ids", 1, field_type::STRING)),
                FieldRules {
                    repeated: Some(RepeatedRules {
                        min_items: Some(2),
                        max_items: None,
                        unique: Some(true),
                    }),
                    ..FieldRules::default()
                },
            ),
            with_rules(
                message_field("node_group", 2, &format!("{}.NodeGroup", package)),
                FieldRules {
                    required: Some(true),
                    ..FieldRules::default()
                },
            ),
            message_field("backup_group", 3, &format!("{}.NodeGroup", package)),
            with_options(
                message_field(
                    "vpc_id",
                    4,
                    "org.openmcf.shared.foreignkey.v1.StringValueOrRef",
                ),
                TestFieldOptions {
                    default_kind: Some(1),
                    default_kind_field_path: Some("status.outputs.vpc_id".to_string()),
                    ..TestFieldOptions::default()
                },
            ),
            FieldDescriptorProto {
                name: Some("environment".to_string()),
                number: Some(5),
                label: Some(field_label::OPTIONAL),
                r#type: Some(field_type::ENUM),
                type_name_raw: Some(format!(".{}.Environment", package)),
                ..FieldDescriptorProto::default()
            },
            repeated(message_field(
                "labels",
                6,
                &format!("{}.AwsEksClusterSpec.LabelsEntry", package),
            )),
            message_field("created_at", 7, "google.protobuf.Timestamp"),
            FieldDescriptorProto {
                oneof_index: Some(0),
                ..scalar_field("nat_gateway", 8, field_type::BOOL)
            },
            FieldDescriptorProto {
                oneof_index: Some(0),
                ..scalar_field("vpn", 9, field_type::BOOL)
            },
            message_field("tree", 10, &format!("{}.Tree", package)),
        ],
        nested_type: vec![labels_entry],
        oneof_decl: vec![OneofDescriptorProto {
            name: Some("connection".to_string()),
        }],
        ..DescriptorProto::default()
    };

    let node_group = DescriptorProto {
        name: Some("NodeGroup".to_string()),
        field: vec![
            with_rules(
                scalar_field("name", 1, field_type::STRING),
                FieldRules {
                    string: Some(StringRules {
                        min_len: Some(1),
                        ..StringRules::default()
                    }),
                    ..FieldRules::default()
                },
            ),
            with_rules(
                scalar_field("count", 2, field_type::INT32),
                FieldRules {
                    int32: Some(Int32Rules {
                        gt: Some(0),
                        ..Int32Rules::default()
                    }),
                    ..FieldRules::default()
                },
            ),
        ],
        ..DescriptorProto::default()
    };

    let tree = DescriptorProto {
        name: Some("Tree".to_string()),
        field: vec![repeated(message_field(
            "children",
            1,
            &format!("{}.Tree", package),
        ))],
        ..DescriptorProto::default()
    };

    FileDescriptorProto {
        name: Some("org/openmcf/provider/aws/eks-cluster/v1/spec.proto".to_string()),
        package: Some(package.to_string()),
        message_type: vec![spec, node_group, tree],
        enum_type: vec![EnumDescriptorProto {
            name: Some("Environment".to_string()),
            value: vec![
                EnumValueDescriptorProto {
                    name: Some("ENVIRONMENT_UNSPECIFIED".to_string()),
                    number: Some(0),
                },
                EnumValueDescriptorProto {
                    name: Some("DEV".to_string()),
                    number: Some(1),
                },
                EnumValueDescriptorProto {
                    name: Some("PROD".to_string()),
                    number: Some(2),
                },
            ],
        }],
        source_code_info: Some(SourceCodeInfo {
            location: vec![
                Location {
                    path: vec![4, 0, 2, 0],
                    leading_comments: Some(" Subnets the cluster spans.\n".to_string()),
                },
                Location {
                    path: vec![4, 1],
                    leading_comments: Some(" A group of worker nodes.\n".to_string()),
                },
            ],
        }),
    }
}

fn foo_api_file() -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some("org/openmcf/provider/test/foo/v1/api.proto".to_string()),
        package: Some("org.openmcf.provider.test.foo.v1".to_string()),
        message_type: vec![DescriptorProto {
            name: Some("Foo".to_string()),
            field: vec![
                with_rules(
                    scalar_field("api_version", 1, field_type::STRING),
                    string_const_rules("test.openmcf.org/v1"),
                ),
                with_rules(
                    scalar_field("kind", 2, field_type::STRING),
                    string_const_rules("Foo"),
                ),
            ],
            ..DescriptorProto::default()
        }],
        enum_type: vec![],
        source_code_info: None,
    }
}

fn foo_spec_file() -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some("org/openmcf/provider/test/foo/v1/spec.proto".to_string()),
        package: Some("org.openmcf.provider.test.foo.v1".to_string()),
        message_type: vec![DescriptorProto {
            name: Some("FooSpec".to_string()),
            field: vec![
                with_rules(
                    scalar_field("name", 1, field_type::STRING),
                    FieldRules {
                        required: Some(true),
                        string: Some(StringRules {
                            min_len: Some(3),
                            ..StringRules::default()
                        }),
                        ..FieldRules::default()
                    },
                ),
                with_rules(
                    scalar_field("count", 2, field_type::INT32),
                    FieldRules {
                        int32: Some(Int32Rules {
                            gt: Some(0),
                            ..Int32Rules::default()
                        }),
                        ..FieldRules::default()
                    },
                ),
            ],
            ..DescriptorProto::default()
        }],
        enum_type: vec![],
        source_code_info: None,
    }
}

pub fn fixture_set() -> FileDescriptorSet {
    FileDescriptorSet {
        file: vec![
            kind_enum_file(),
            metadata_file(),
            eks_api_file(),
            eks_spec_file(),
            foo_api_file(),
            foo_spec_file(),
        ],
    }
}

/// Fixture index, round-tripped through wire bytes so the same decode path
/// a real descriptor image takes is exercised.
pub fn fixture_index() -> DescriptorIndex {
    DescriptorIndex::from_bytes(&fixture_set().encode_to_vec()).expect("fixture image decodes")
}
