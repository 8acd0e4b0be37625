use std::rc::Rc;

use glow::HasContext;

use crate::error::{ComputeError, CrateResult};

/// A linked compute program. Deleted on drop.
pub struct ComputeProgram {
    gl: Rc<glow::Context>,
    program: glow::Program,
}

impl ComputeProgram {
    /// Compile `source` as a compute shader and link it into a program
    pub fn new(gl: &Rc<glow::Context>, source: &str) -> CrateResult<Self> {
        unsafe {
            let shader = gl
                .create_shader(glow::COMPUTE_SHADER)
                .map_err(ComputeError::ProgramCreation)?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);
            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                return Err(ComputeError::ShaderCompile(log));
            }

            let program = match gl.create_program() {
                Ok(program) => program,
                Err(e) => {
                    gl.delete_shader(shader);
                    return Err(ComputeError::ProgramCreation(e));
                }
            };
            gl.attach_shader(program, shader);
            gl.link_program(program);
            gl.detach_shader(program, shader);
            gl.delete_shader(shader);

            // Wrap before the status check so a failed link still deletes the program
            let program = Self {
                gl: gl.clone(),
                program,
            };
            if !program.link_status() {
                return Err(ComputeError::ShaderLink(program.info_log()));
            }
            Ok(program)
        }
    }

    pub fn link_status(&self) -> bool {
        unsafe { self.gl.get_program_link_status(self.program) }
    }

    pub fn info_log(&self) -> String {
        unsafe { self.gl.get_program_info_log(self.program) }
    }

    pub fn use_program(&self) {
        unsafe { self.gl.use_program(Some(self.program)) }
    }

    /// Set a `uint` uniform. The program must be in use. Unknown names are ignored, as GL does for location -1.
    pub fn set_uniform_u32(&self, name: &str, value: u32) {
        unsafe {
            let location = self.gl.get_uniform_location(self.program, name);
            if location.is_none() {
                log::warn!("Uniform `{name}` is not active in the compute program");
            }
            self.gl.uniform_1_u32(location.as_ref(), value);
        }
    }
}

impl Drop for ComputeProgram {
    fn drop(&mut self) {
        unsafe { self.gl.delete_program(self.program) }
    }
}
