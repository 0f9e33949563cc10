pub mod autorizacion;
pub mod circuito;
pub mod comprobante;
pub mod credencial;
pub mod id;
pub mod mesa;
pub mod observado;
pub mod padron;
pub mod seleccion;
pub mod voto;

pub use autorizacion::{AuthEstado, EstadoVotante, RegistroAutorizacion};
pub use circuito::Circuito;
pub use comprobante::Comprobante;
pub use credencial::Credencial;
pub use id::Id;
pub use mesa::{Mesa, MesaEstado};
pub use observado::{Accion, EstadoObservado, ObservadoPendiente, VotoObservado};
pub use padron::{Candidato, InscripcionPadron, Padron, Partido};
pub use seleccion::Seleccion;
pub use voto::{Elegibilidad, Voto};
