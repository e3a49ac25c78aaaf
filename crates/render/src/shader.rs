use std::borrow::Cow;

use crate::RenderError;

/// First word of every SPIR-V module.
pub const SPIRV_MAGIC: u32 = 0x0723_0203;

/// No-op vertex stage for the voxel pipeline: `OpEntryPoint Vertex %main "main"`
/// around an empty function.
#[rustfmt::skip]
const VOXEL_VERTEX_WORDS: [u32; 25] = [
    SPIRV_MAGIC, 0x0001_0000, 0, 5, 0,
    0x0002_0011, 1,
    0x0003_000e, 0, 1,
    0x0005_000f, 0, 1, 0x6e69_616d, 0,
    0x0002_0013, 2,
    0x0003_0021, 3, 2,
    0x0005_0036, 2, 1, 0, 3,
];

/// Fragment counterpart of [`VOXEL_VERTEX_WORDS`], with `OriginUpperLeft`.
#[rustfmt::skip]
const VOXEL_FRAGMENT_WORDS: [u32; 28] = [
    SPIRV_MAGIC, 0x0001_0000, 0, 5, 0,
    0x0002_0011, 1,
    0x0003_000e, 0, 1,
    0x0005_000f, 4, 1, 0x6e69_616d, 0,
    0x0003_0010, 1, 7,
    0x0002_0013, 2,
    0x0003_0021, 3, 2,
    0x0005_0036, 2, 1, 0, 3,
];

/// Shared function body: `OpLabel`, `OpReturn`, `OpFunctionEnd`.
const FUNCTION_TAIL: [u32; 4] = [0x0002_00f8, 4, 0x0001_00fd, 0x0001_0038];

/// Shader modules the voxel pipeline is built from, vertex stage first.
pub fn builtin_shaders() -> [ShaderBytecode; 2] {
    let module = |name: &str, head: &[u32]| {
        let words: Vec<u32> = head.iter().chain(&FUNCTION_TAIL).copied().collect();
        ShaderBytecode::from_words(name, &words)
    };
    [
        module("voxel.vert", &VOXEL_VERTEX_WORDS),
        module("voxel.frag", &VOXEL_FRAGMENT_WORDS),
    ]
}

/// Precompiled shader blob. The engine never inspects it beyond [`validate`].
///
/// [`validate`]: ShaderBytecode::validate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderBytecode {
    name: String,
    bytes: Cow<'static, [u8]>,
}

impl ShaderBytecode {
    pub fn new(name: impl Into<String>, bytes: impl Into<Cow<'static, [u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Wrap a blob embedded with `include_bytes!`.
    pub fn from_static(name: &str, bytes: &'static [u8]) -> Self {
        Self::new(name, bytes)
    }

    /// Build a blob from native-endian words.
    pub fn from_words(name: &str, words: &[u32]) -> Self {
        Self::new(name, bytemuck::cast_slice::<u32, u8>(words).to_vec())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Checks the blob is a whole number of 32-bit words starting with the
    /// SPIR-V magic number, in either byte order.
    pub fn validate(&self) -> Result<(), RenderError> {
        let invalid = |reason: &str| RenderError::InvalidShader {
            name: self.name.clone(),
            reason: reason.to_owned(),
        };
        if self.bytes.is_empty() {
            return Err(invalid("empty blob"));
        }
        if self.bytes.len() % 4 != 0 {
            return Err(invalid("length is not a multiple of 4"));
        }
        let head = [self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3]];
        if u32::from_le_bytes(head) != SPIRV_MAGIC && u32::from_be_bytes(head) != SPIRV_MAGIC {
            return Err(invalid("missing SPIR-V magic number"));
        }
        Ok(())
    }
}
